use std::sync::Arc;

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::period::utc_to_jakarta;
use crate::core::{AppError, Result};
use crate::modules::billing::models::{
    MonthlyRevenue, ProductRevenue, ProductType, Transaction, TransactionFilter,
};
use crate::modules::billing::repositories::TransactionRepository;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Revenue per product type across all successful transactions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueSummary {
    pub products: Vec<ProductRevenue>,
    pub transaction_count: i64,
    pub total_revenue: Decimal,
}

/// Revenue per month of one year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenueReport {
    pub year: i32,
    pub months: Vec<MonthlyRevenue>,
    pub total_revenue: Decimal,
}

/// Read side of the transaction store: history, admin listing, revenue
pub struct TransactionQueryService {
    transactions: Arc<dyn TransactionRepository>,
}

impl TransactionQueryService {
    pub fn new(transactions: Arc<dyn TransactionRepository>) -> Self {
        Self { transactions }
    }

    /// Caller's own transactions, newest first
    pub async fn history(
        &self,
        user_id: &str,
        product_type: Option<ProductType>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>> {
        let filter = TransactionFilter {
            user_id: Some(user_id.to_string()),
            product_type,
            ..Default::default()
        };

        let (limit, offset) = page(limit, offset);
        self.transactions.list(&filter, limit, offset).await
    }

    pub async fn get_for_user(&self, user_id: &str, transaction_id: &str) -> Result<Transaction> {
        let transaction = self
            .transactions
            .find_by_id(transaction_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Transaction '{}' not found", transaction_id))
            })?;

        if !transaction.is_owned_by(user_id) {
            return Err(AppError::forbidden("Transaction belongs to another user"));
        }

        Ok(transaction)
    }

    pub async fn list(
        &self,
        filter: &TransactionFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>> {
        let (limit, offset) = page(limit, offset);
        self.transactions.list(filter, limit, offset).await
    }

    pub async fn revenue_summary(&self) -> Result<RevenueSummary> {
        let products = self.transactions.revenue_by_product().await?;

        Ok(RevenueSummary {
            transaction_count: products.iter().map(|p| p.transaction_count).sum(),
            total_revenue: products.iter().map(|p| p.total_revenue).sum(),
            products,
        })
    }

    /// Monthly revenue; defaults to the current year in Jakarta time
    pub async fn monthly_revenue(&self, year: Option<i32>) -> Result<MonthlyRevenueReport> {
        let year = year.unwrap_or_else(|| utc_to_jakarta(Utc::now()).year());
        let months = self.transactions.revenue_by_month(year).await?;

        Ok(MonthlyRevenueReport {
            year,
            total_revenue: months.iter().map(|m| m.total_revenue).sum(),
            months,
        })
    }
}

fn page(limit: i64, offset: i64) -> (i64, i64) {
    (limit.clamp(1, MAX_PAGE_SIZE), offset.max(0))
}
