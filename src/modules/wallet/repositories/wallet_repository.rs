use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::MySqlPool;

use crate::core::error::{is_unique_violation, AppError};
use crate::core::Result;
use crate::modules::billing::models::{Transaction, TransactionStatus};
use crate::modules::billing::repositories::insert_transaction;
use crate::modules::wallet::models::{
    DebitOutcome, SettlementOutcome, SettlementRequest, TopUpOutcome, TransferOutcome,
    WalletAccount,
};

/// Balance storage
///
/// Every method that moves money and writes a transaction record does both
/// inside one storage transaction.
#[async_trait]
pub trait WalletRepository: Send + Sync {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<WalletAccount>>;

    async fn find_by_phone(&self, phone: &str) -> Result<Option<WalletAccount>>;

    /// Decrement only if the balance covers the amount
    async fn debit(&self, user_id: &str, amount: Decimal) -> Result<DebitOutcome>;

    async fn credit(&self, user_id: &str, amount: Decimal) -> Result<Decimal>;

    /// Debit the transaction total and mark it `successful`, atomically
    async fn settle(&self, request: &SettlementRequest) -> Result<SettlementOutcome>;

    /// Move `record.total_price` from sender to recipient and store the record
    async fn transfer(
        &self,
        from_user_id: &str,
        to_user_id: &str,
        record: &Transaction,
    ) -> Result<TransferOutcome>;

    /// Credit `record.price` and store the record; idempotent on `record.id`
    async fn top_up(&self, user_id: &str, record: &Transaction) -> Result<TopUpOutcome>;
}

pub struct MySqlWalletRepository {
    pool: MySqlPool,
}

impl MySqlWalletRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn user_not_found(user_id: &str) -> AppError {
        AppError::not_found(format!("User '{}' not found", user_id))
    }
}

const ACCOUNT_COLUMNS: &str = "id, name, email, phone, balance, created_at, updated_at";

#[async_trait]
impl WalletRepository for MySqlWalletRepository {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<WalletAccount>> {
        let query = format!(
            "SELECT {} FROM users WHERE id = ? AND deleted_at IS NULL",
            ACCOUNT_COLUMNS
        );

        sqlx::query_as::<_, WalletAccount>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database("find user by id", e))
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<WalletAccount>> {
        let query = format!(
            "SELECT {} FROM users WHERE phone = ? AND deleted_at IS NULL",
            ACCOUNT_COLUMNS
        );

        sqlx::query_as::<_, WalletAccount>(&query)
            .bind(phone)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database("find user by phone", e))
    }

    async fn debit(&self, user_id: &str, amount: Decimal) -> Result<DebitOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database("begin debit", e))?;

        let balance: Option<Decimal> = sqlx::query_scalar(
            "SELECT balance FROM users WHERE id = ? AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::database("lock user balance", e))?;

        let balance = balance.ok_or_else(|| Self::user_not_found(user_id))?;
        if balance < amount {
            return Ok(DebitOutcome::Insufficient { balance });
        }

        sqlx::query("UPDATE users SET balance = balance - ? WHERE id = ? AND balance >= ?")
            .bind(amount)
            .bind(user_id)
            .bind(amount)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database("debit balance", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database("commit debit", e))?;

        Ok(DebitOutcome::Debited {
            balance: balance - amount,
        })
    }

    async fn credit(&self, user_id: &str, amount: Decimal) -> Result<Decimal> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database("begin credit", e))?;

        let result = sqlx::query(
            "UPDATE users SET balance = balance + ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(amount)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database("credit balance", e))?;

        if result.rows_affected() == 0 {
            return Err(Self::user_not_found(user_id));
        }

        let balance: Decimal = sqlx::query_scalar("SELECT balance FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::database("read balance", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database("commit credit", e))?;

        Ok(balance)
    }

    async fn settle(&self, request: &SettlementRequest) -> Result<SettlementOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database("begin settlement", e))?;

        // Lock order: user row, then transaction row
        let balance: Option<Decimal> = sqlx::query_scalar(
            "SELECT balance FROM users WHERE id = ? AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(&request.user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::database("lock user balance", e))?;
        let balance = balance.ok_or_else(|| Self::user_not_found(&request.user_id))?;

        let row: Option<(String, Decimal)> = sqlx::query_as(
            r#"
            SELECT status, total_price
            FROM transactions
            WHERE id = ? AND user_id = ? AND deleted_at IS NULL
            FOR UPDATE
            "#,
        )
        .bind(&request.transaction_id)
        .bind(&request.user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::database("lock transaction", e))?;

        let (status, total_price) = row.ok_or_else(|| {
            AppError::not_found(format!("Transaction '{}' not found", request.transaction_id))
        })?;

        let status: TransactionStatus = status.parse()?;
        if !TransactionStatus::PAYABLE.contains(&status) {
            return Ok(SettlementOutcome::NotPayable { status });
        }

        if balance < total_price {
            return Ok(SettlementOutcome::InsufficientFunds { balance });
        }

        let updated = sqlx::query(
            r#"
            UPDATE transactions
            SET status = 'successful', product_detail = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ? AND status IN ('unpaid', 'processing')
            "#,
        )
        .bind(Json(&request.product_detail))
        .bind(&request.transaction_id)
        .execute(&mut *tx)
        .await;

        match updated {
            Ok(result) if result.rows_affected() == 1 => {}
            Ok(_) => return Ok(SettlementOutcome::NotPayable { status }),
            Err(e) if is_unique_violation(&e) => {
                return Ok(SettlementOutcome::BillAlreadySettled);
            }
            Err(e) => return Err(AppError::database("finalize transaction", e)),
        }

        sqlx::query("UPDATE users SET balance = balance - ? WHERE id = ?")
            .bind(total_price)
            .bind(&request.user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database("debit balance", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database("commit settlement", e))?;

        Ok(SettlementOutcome::Settled {
            balance: balance - total_price,
        })
    }

    async fn transfer(
        &self,
        from_user_id: &str,
        to_user_id: &str,
        record: &Transaction,
    ) -> Result<TransferOutcome> {
        let amount = record.total_price;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database("begin transfer", e))?;

        // Both rows locked in id order
        let rows: Vec<(String, Decimal)> = sqlx::query_as(
            r#"
            SELECT id, balance FROM users
            WHERE id IN (?, ?) AND deleted_at IS NULL
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(from_user_id)
        .bind(to_user_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| AppError::database("lock transfer accounts", e))?;

        let sender_balance = rows
            .iter()
            .find(|(id, _)| id == from_user_id)
            .map(|(_, balance)| *balance)
            .ok_or_else(|| Self::user_not_found(from_user_id))?;
        if !rows.iter().any(|(id, _)| id == to_user_id) {
            return Err(Self::user_not_found(to_user_id));
        }

        if sender_balance < amount {
            return Ok(TransferOutcome::InsufficientFunds {
                balance: sender_balance,
            });
        }

        sqlx::query("UPDATE users SET balance = balance - ? WHERE id = ?")
            .bind(amount)
            .bind(from_user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database("debit sender", e))?;

        sqlx::query("UPDATE users SET balance = balance + ? WHERE id = ?")
            .bind(amount)
            .bind(to_user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database("credit recipient", e))?;

        insert_transaction(&mut *tx, record)
            .await
            .map_err(|e| AppError::database("record transfer", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database("commit transfer", e))?;

        Ok(TransferOutcome::Transferred {
            balance: sender_balance - amount,
        })
    }

    async fn top_up(&self, user_id: &str, record: &Transaction) -> Result<TopUpOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database("begin top-up", e))?;

        // The record id is derived from the aggregator trx id, so a replay collides here
        match insert_transaction(&mut *tx, record).await {
            Ok(()) => {}
            Err(e) if is_unique_violation(&e) => return Ok(TopUpOutcome::Duplicate),
            Err(e) => return Err(AppError::database("record top-up", e)),
        }

        let result = sqlx::query(
            "UPDATE users SET balance = balance + ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(record.price)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database("credit top-up", e))?;

        if result.rows_affected() == 0 {
            return Err(Self::user_not_found(user_id));
        }

        let balance: Decimal = sqlx::query_scalar("SELECT balance FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::database("read balance", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database("commit top-up", e))?;

        Ok(TopUpOutcome::Credited { balance })
    }
}
