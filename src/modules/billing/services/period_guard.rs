use std::sync::Arc;

use crate::core::{AppError, BillingPeriod, Result};
use crate::modules::billing::models::{ProductType, Transaction, TransactionStatus};
use crate::modules::billing::repositories::TransactionRepository;

/// Message returned when the period's bill is already settled
pub const ALREADY_PAID_MESSAGE: &str = "this month's bill has been paid";

/// Outcome of a period guard check
#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    /// No pending or settled bill; a new transaction may be created
    Proceed,

    /// A pending transaction already exists for this bill
    Replay(Transaction),
}

/// At most one settlement per customer, product and period
pub struct PeriodGuard {
    transactions: Arc<dyn TransactionRepository>,
}

impl PeriodGuard {
    pub fn new(transactions: Arc<dyn TransactionRepository>) -> Self {
        Self { transactions }
    }

    pub async fn find_existing(
        &self,
        product_type: ProductType,
        period: &BillingPeriod,
        customer_id: &str,
    ) -> Result<Option<Transaction>> {
        self.transactions
            .find_by_period_and_customer(product_type, period, customer_id)
            .await
    }

    /// Decide whether an inquiry may create a transaction
    ///
    /// A settled bill is rejected; a pending one is handed back unchanged.
    /// Failed attempts are terminal and do not block a fresh transaction.
    pub async fn check(
        &self,
        product_type: ProductType,
        period: &BillingPeriod,
        customer_id: &str,
    ) -> Result<GuardDecision> {
        let existing = self
            .find_existing(product_type, period, customer_id)
            .await?;

        match existing {
            None => Ok(GuardDecision::Proceed),
            Some(tx) => match tx.status {
                TransactionStatus::Successful => {
                    tracing::warn!(
                        transaction_id = %tx.id,
                        customer_id = %customer_id,
                        period = %period,
                        "Bill already settled for period"
                    );
                    Err(AppError::already_settled(ALREADY_PAID_MESSAGE))
                }
                TransactionStatus::Unpaid | TransactionStatus::Processing => {
                    tracing::debug!(transaction_id = %tx.id, "Returning pending transaction");
                    Ok(GuardDecision::Replay(tx))
                }
                TransactionStatus::Fail => Ok(GuardDecision::Proceed),
            },
        }
    }
}
