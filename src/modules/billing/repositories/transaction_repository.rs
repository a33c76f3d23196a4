use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{MySql, MySqlPool, QueryBuilder};

use crate::core::error::{is_unique_violation, AppError};
use crate::core::{BillingPeriod, Result};
use crate::modules::billing::models::{
    MonthlyRevenue, ProductRevenue, ProductType, Transaction, TransactionFilter, TransactionRow,
    TransactionStatus,
};

/// Transaction persistence
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Insert a new transaction; a duplicate id yields `Conflict`
    async fn create(&self, transaction: &Transaction) -> Result<Transaction>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Transaction>>;

    /// Period guard lookup
    ///
    /// Prefers a `successful` row, then the newest pending one, then `fail`.
    async fn find_by_period_and_customer(
        &self,
        product_type: ProductType,
        period: &BillingPeriod,
        customer_id: &str,
    ) -> Result<Option<Transaction>>;

    /// Compare-and-swap status change; false when the row was not in `from`
    async fn update_status(
        &self,
        id: &str,
        from: &[TransactionStatus],
        to: TransactionStatus,
    ) -> Result<bool>;

    async fn list(
        &self,
        filter: &TransactionFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>>;

    /// Successful revenue per product type
    async fn revenue_by_product(&self) -> Result<Vec<ProductRevenue>>;

    /// Successful revenue per month of the given year
    async fn revenue_by_month(&self, year: i32) -> Result<Vec<MonthlyRevenue>>;
}

pub struct MySqlTransactionRepository {
    pool: MySqlPool,
}

pub(crate) const TRANSACTION_COLUMNS: &str = "id, user_id, status, product_type, product_detail, \
     description, price, admin_fee, discount_price, total_price, created_at, updated_at, deleted_at";

impl MySqlTransactionRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

/// Insert a transaction row using any executor (pool or open transaction)
pub(crate) async fn insert_transaction<'e, E>(
    executor: E,
    transaction: &Transaction,
) -> std::result::Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    sqlx::query(
        r#"
        INSERT INTO transactions (
            id, user_id, status, product_type, product_detail, description,
            price, admin_fee, discount_price, total_price, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&transaction.id)
    .bind(&transaction.user_id)
    .bind(transaction.status.as_str())
    .bind(transaction.product_type.as_str())
    .bind(Json(&transaction.product_detail))
    .bind(&transaction.description)
    .bind(transaction.price)
    .bind(transaction.admin_fee)
    .bind(transaction.discount_price)
    .bind(transaction.total_price)
    .bind(transaction.created_at)
    .bind(transaction.updated_at)
    .execute(executor)
    .await
    .map(|_| ())
}

fn into_transactions(rows: Vec<TransactionRow>) -> Result<Vec<Transaction>> {
    rows.into_iter().map(Transaction::try_from).collect()
}

#[async_trait]
impl TransactionRepository for MySqlTransactionRepository {
    async fn create(&self, transaction: &Transaction) -> Result<Transaction> {
        insert_transaction(&self.pool, transaction)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::conflict(format!("Transaction '{}' already exists", transaction.id))
                } else {
                    AppError::database("create transaction", e)
                }
            })?;

        self.find_by_id(&transaction.id)
            .await?
            .ok_or_else(|| AppError::internal("Transaction was created but not found"))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Transaction>> {
        let query = format!(
            "SELECT {} FROM transactions WHERE id = ? AND deleted_at IS NULL",
            TRANSACTION_COLUMNS
        );

        let row = sqlx::query_as::<_, TransactionRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database("find transaction by id", e))?;

        row.map(Transaction::try_from).transpose()
    }

    async fn find_by_period_and_customer(
        &self,
        product_type: ProductType,
        period: &BillingPeriod,
        customer_id: &str,
    ) -> Result<Option<Transaction>> {
        let query = format!(
            r#"
            SELECT {}
            FROM transactions
            WHERE product_type = ?
              AND detail_period = ?
              AND detail_customer_id = ?
              AND deleted_at IS NULL
            ORDER BY FIELD(status, 'successful', 'unpaid', 'processing', 'fail'), created_at DESC
            LIMIT 1
            "#,
            TRANSACTION_COLUMNS
        );

        let row = sqlx::query_as::<_, TransactionRow>(&query)
            .bind(product_type.as_str())
            .bind(period.as_str())
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database("find transaction by period", e))?;

        row.map(Transaction::try_from).transpose()
    }

    async fn update_status(
        &self,
        id: &str,
        from: &[TransactionStatus],
        to: TransactionStatus,
    ) -> Result<bool> {
        if from.is_empty() {
            return Ok(false);
        }

        let mut builder: QueryBuilder<MySql> = QueryBuilder::new("UPDATE transactions SET status = ");
        builder.push_bind(to.as_str());
        builder.push(", updated_at = CURRENT_TIMESTAMP WHERE id = ");
        builder.push_bind(id);
        builder.push(" AND status IN (");
        let mut separated = builder.separated(", ");
        for status in from {
            separated.push_bind(status.as_str());
        }
        separated.push_unseparated(")");

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database("update transaction status", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(
        &self,
        filter: &TransactionFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>> {
        let mut builder: QueryBuilder<MySql> = QueryBuilder::new(format!(
            "SELECT {} FROM transactions WHERE deleted_at IS NULL",
            TRANSACTION_COLUMNS
        ));

        if let Some(user_id) = &filter.user_id {
            builder.push(" AND user_id = ").push_bind(user_id.clone());
        }
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(product_type) = filter.product_type {
            builder
                .push(" AND product_type = ")
                .push_bind(product_type.as_str());
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", search.trim());
            builder
                .push(" AND (id LIKE ")
                .push_bind(pattern.clone())
                .push(" OR description LIKE ")
                .push_bind(pattern)
                .push(")");
        }

        builder
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = builder
            .build_query_as::<TransactionRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database("list transactions", e))?;

        into_transactions(rows)
    }

    async fn revenue_by_product(&self) -> Result<Vec<ProductRevenue>> {
        sqlx::query_as::<_, ProductRevenue>(
            r#"
            SELECT product_type,
                   COUNT(*) AS transaction_count,
                   SUM(total_price) AS total_revenue
            FROM transactions
            WHERE status = 'successful' AND deleted_at IS NULL
            GROUP BY product_type
            ORDER BY product_type
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database("revenue by product", e))
    }

    async fn revenue_by_month(&self, year: i32) -> Result<Vec<MonthlyRevenue>> {
        sqlx::query_as::<_, MonthlyRevenue>(
            r#"
            SELECT CAST(MONTH(created_at) AS SIGNED) AS month,
                   COUNT(*) AS transaction_count,
                   SUM(total_price) AS total_revenue
            FROM transactions
            WHERE status = 'successful'
              AND deleted_at IS NULL
              AND YEAR(created_at) = ?
            GROUP BY MONTH(created_at)
            ORDER BY month
            "#,
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database("revenue by month", e))
    }
}
