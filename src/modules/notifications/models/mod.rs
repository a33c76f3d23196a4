use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::modules::billing::models::{ProductType, Transaction, TransactionStatus};
use crate::modules::wallet::models::WalletAccount;

/// Payment confirmation sent to the wallet holder
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentReceipt {
    pub order_id: String,
    pub customer_name: String,
    pub recipient_email: String,
    pub status: TransactionStatus,
    pub product_type: ProductType,
    pub description: String,
    pub price: Decimal,
    pub admin_fee: Decimal,
    pub discount_price: Decimal,
    pub total_price: Decimal,
    pub transaction_at: DateTime<Utc>,
}

impl PaymentReceipt {
    pub fn new(transaction: &Transaction, account: &WalletAccount) -> Self {
        Self {
            order_id: transaction.id.clone(),
            customer_name: account.name.clone(),
            recipient_email: account.email.clone(),
            status: transaction.status,
            product_type: transaction.product_type,
            description: transaction.description.clone(),
            price: transaction.price,
            admin_fee: transaction.admin_fee,
            discount_price: transaction.discount_price,
            total_price: transaction.total_price,
            transaction_at: transaction.updated_at,
        }
    }
}
