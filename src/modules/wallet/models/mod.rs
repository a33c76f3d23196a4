use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::core::money::validate_amount;
use crate::core::{AppError, Result};
use crate::modules::billing::models::{ProductDetail, TransactionStatus};

/// Wallet holder as seen by the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WalletAccount {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub balance: Decimal,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Static VA bound to a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct VirtualAccount {
    pub id: String,
    pub user_id: String,
    pub va_number: String,
    pub va_status: String,
    pub bank_code: String,
    pub amount: Decimal,
    pub expiration_time: i64,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Caller request to issue a VA
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateVaPayload {
    pub bank_code: String,
    #[serde(default)]
    pub amount: Decimal,
}

/// Aggregator notification that a VA received funds
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TopUpCallback {
    pub trx_id: String,
    pub partner_user_id: String,
    pub va_number: String,
    pub amount: Decimal,
    pub success: bool,
    #[serde(default)]
    pub username_display: Option<String>,
    #[serde(default)]
    pub tx_date: Option<String>,
    #[serde(default)]
    pub settlement_status: Option<String>,
}

impl TopUpCallback {
    pub fn validate(&self) -> Result<()> {
        if self.trx_id.trim().is_empty() {
            return Err(AppError::validation("trx_id cannot be empty"));
        }
        if self.partner_user_id.trim().is_empty() {
            return Err(AppError::validation("partner_user_id cannot be empty"));
        }
        validate_amount("amount", self.amount)
    }
}

/// Wallet-to-wallet transfer addressed by recipient phone
#[derive(Debug, Clone, Deserialize)]
pub struct TransferRequest {
    pub phone_number: String,
    pub amount: Decimal,
    #[serde(default)]
    pub note: Option<String>,
}

impl TransferRequest {
    pub fn validate(&self) -> Result<()> {
        if self.phone_number.trim().is_empty() {
            return Err(AppError::validation("Recipient phone number cannot be empty"));
        }
        validate_amount("amount", self.amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceResponse {
    pub balance: Decimal,
}

/// Input to an atomic debit-and-finalize
#[derive(Debug, Clone)]
pub struct SettlementRequest {
    pub user_id: String,
    pub transaction_id: String,
    /// Snapshot written together with the status change
    pub product_detail: ProductDetail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    Debited { balance: Decimal },
    Insufficient { balance: Decimal },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// Wallet debited and transaction marked successful
    Settled { balance: Decimal },

    /// Nothing written
    InsufficientFunds { balance: Decimal },

    /// Transaction already left a payable status
    NotPayable { status: TransactionStatus },

    /// Another transaction already settled the same bill
    BillAlreadySettled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    Transferred { balance: Decimal },
    InsufficientFunds { balance: Decimal },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopUpOutcome {
    Credited { balance: Decimal },
    /// Callback already processed; nothing written
    Duplicate,
}
