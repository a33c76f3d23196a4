use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::core::money::{format_rupiah, validate_amount};
use crate::core::{AppError, Result};
use crate::modules::billing::models::{
    ProductDetail, ProductType, TopupDetail, Transaction, TransactionStatus, TransferDetail,
};
use crate::modules::billing::services::tariff_calculator::TariffCalculator;
use crate::modules::wallet::models::{
    DebitOutcome, SettlementOutcome, SettlementRequest, TopUpCallback, TopUpOutcome,
    TransferOutcome, TransferRequest, WalletAccount,
};
use crate::modules::wallet::repositories::WalletRepository;

/// Message surfaced whenever a wallet cannot cover a payment
pub const INSUFFICIENT_BALANCE_MESSAGE: &str = "your balance is not enough";

/// Result of processing a top-up callback
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopUpReceipt {
    pub transaction_id: String,
    pub amount: Decimal,
    /// Balance after crediting; absent for replays
    pub balance: Option<Decimal>,
    pub duplicate: bool,
}

/// Sole mutator of wallet balances
pub struct WalletLedger {
    wallets: Arc<dyn WalletRepository>,
    calculator: TariffCalculator,
}

impl WalletLedger {
    pub fn new(wallets: Arc<dyn WalletRepository>) -> Self {
        Self {
            wallets,
            calculator: TariffCalculator::new(),
        }
    }

    pub async fn find_account(&self, user_id: &str) -> Result<Option<WalletAccount>> {
        self.wallets.find_by_id(user_id).await
    }

    pub async fn account(&self, user_id: &str) -> Result<WalletAccount> {
        self.find_account(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User '{}' not found", user_id)))
    }

    pub async fn balance(&self, user_id: &str) -> Result<Decimal> {
        Ok(self.account(user_id).await?.balance)
    }

    /// Debit a wallet; fails with `InsufficientFunds` rather than going negative
    pub async fn debit(&self, user_id: &str, amount: Decimal) -> Result<Decimal> {
        validate_amount("amount", amount)?;

        match self.wallets.debit(user_id, amount).await? {
            DebitOutcome::Debited { balance } => {
                tracing::info!(user_id = %user_id, amount = %amount, balance = %balance, "Wallet debited");
                Ok(balance)
            }
            DebitOutcome::Insufficient { balance } => {
                tracing::warn!(user_id = %user_id, amount = %amount, balance = %balance, "Debit rejected");
                Err(AppError::insufficient_funds(INSUFFICIENT_BALANCE_MESSAGE))
            }
        }
    }

    pub async fn credit(&self, user_id: &str, amount: Decimal) -> Result<Decimal> {
        validate_amount("amount", amount)?;

        let balance = self.wallets.credit(user_id, amount).await?;
        tracing::info!(user_id = %user_id, amount = %amount, balance = %balance, "Wallet credited");
        Ok(balance)
    }

    /// Debit the transaction total and finalize it in one storage transaction
    pub async fn settle(&self, request: &SettlementRequest) -> Result<SettlementOutcome> {
        let outcome = self.wallets.settle(request).await?;

        match outcome {
            SettlementOutcome::Settled { balance } => tracing::info!(
                user_id = %request.user_id,
                transaction_id = %request.transaction_id,
                balance = %balance,
                "Transaction settled"
            ),
            other => tracing::warn!(
                user_id = %request.user_id,
                transaction_id = %request.transaction_id,
                outcome = ?other,
                "Settlement not applied"
            ),
        }

        Ok(outcome)
    }

    /// Send money to another wallet addressed by phone number
    pub async fn transfer(&self, from_user_id: &str, request: TransferRequest) -> Result<Transaction> {
        request.validate()?;

        let sender = self
            .find_account(from_user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("unauthorized"))?;

        let phone = request.phone_number.trim();
        let recipient = self
            .wallets
            .find_by_phone(phone)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No wallet registered to {}", phone)))?;

        if recipient.id == sender.id {
            return Err(AppError::validation("Cannot transfer to your own wallet"));
        }

        let record = Transaction::new(
            Uuid::new_v4().to_string(),
            sender.id.clone(),
            TransactionStatus::Successful,
            ProductType::Transfer,
            ProductDetail::Transfer(TransferDetail {
                recipient_id: recipient.id.clone(),
                recipient_name: recipient.name.clone(),
                phone_number: recipient.phone.clone(),
                note: request.note,
            }),
            format!("Transfer {} to {}", format_rupiah(request.amount), recipient.name),
            self.calculator
                .compose(request.amount, Decimal::ZERO, Decimal::ZERO)?,
        )?;

        match self.wallets.transfer(&sender.id, &recipient.id, &record).await? {
            TransferOutcome::Transferred { balance } => {
                tracing::info!(
                    transaction_id = %record.id,
                    from = %sender.id,
                    to = %recipient.id,
                    amount = %request.amount,
                    balance = %balance,
                    "Transfer completed"
                );
                Ok(record)
            }
            TransferOutcome::InsufficientFunds { balance } => {
                tracing::warn!(user_id = %sender.id, balance = %balance, "Transfer rejected");
                Err(AppError::insufficient_funds(INSUFFICIENT_BALANCE_MESSAGE))
            }
        }
    }

    /// Credit a wallet from an aggregator deposit notification
    pub async fn top_up(&self, callback: TopUpCallback) -> Result<TopUpReceipt> {
        callback.validate()?;

        if !callback.success {
            tracing::warn!(trx_id = %callback.trx_id, "Ignoring unsuccessful top-up callback");
            return Err(AppError::validation("Top-up was not successful"));
        }

        let account = self.account(&callback.partner_user_id).await?;
        let record = Transaction::new(
            format!("TOPUP-{}", callback.trx_id.trim()),
            account.id.clone(),
            TransactionStatus::Successful,
            ProductType::Topup,
            ProductDetail::Topup(TopupDetail {
                aggregator_trx_id: callback.trx_id.clone(),
                va_number: callback.va_number.clone(),
                amount: callback.amount,
            }),
            format!("Top up {}", format_rupiah(callback.amount)),
            self.calculator
                .compose(callback.amount, Decimal::ZERO, Decimal::ZERO)?,
        )?;

        match self.wallets.top_up(&account.id, &record).await? {
            TopUpOutcome::Credited { balance } => {
                tracing::info!(
                    transaction_id = %record.id,
                    user_id = %account.id,
                    amount = %callback.amount,
                    balance = %balance,
                    "Top-up credited"
                );
                Ok(TopUpReceipt {
                    transaction_id: record.id,
                    amount: callback.amount,
                    balance: Some(balance),
                    duplicate: false,
                })
            }
            TopUpOutcome::Duplicate => {
                tracing::info!(transaction_id = %record.id, "Top-up callback replayed");
                Ok(TopUpReceipt {
                    transaction_id: record.id,
                    amount: callback.amount,
                    balance: None,
                    duplicate: true,
                })
            }
        }
    }
}
