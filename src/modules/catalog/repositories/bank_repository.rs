use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::core::error::{is_unique_violation, AppError};
use crate::core::Result;
use crate::modules::catalog::models::Bank;

#[async_trait]
pub trait BankRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Bank>>;

    async fn list(&self) -> Result<Vec<Bank>>;

    async fn create(&self, bank: &Bank) -> Result<Bank>;

    async fn update(&self, bank: &Bank) -> Result<Bank>;

    /// Soft delete; false when nothing matched
    async fn delete(&self, id: &str) -> Result<bool>;
}

pub struct MySqlBankRepository {
    pool: MySqlPool,
}

impl MySqlBankRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn map_write_error(err: sqlx::Error, bank_code: &str, operation: &str) -> AppError {
        if is_unique_violation(&err) {
            AppError::conflict(format!("Bank code '{}' already exists", bank_code))
        } else {
            AppError::database(operation, err)
        }
    }
}

const BANK_COLUMNS: &str = "id, name, image, bank_code, created_at, updated_at";

#[async_trait]
impl BankRepository for MySqlBankRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Bank>> {
        let query = format!(
            "SELECT {} FROM banks WHERE id = ? AND deleted_at IS NULL",
            BANK_COLUMNS
        );

        sqlx::query_as::<_, Bank>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database("find bank by id", e))
    }

    async fn list(&self) -> Result<Vec<Bank>> {
        let query = format!(
            "SELECT {} FROM banks WHERE deleted_at IS NULL ORDER BY name ASC",
            BANK_COLUMNS
        );

        sqlx::query_as::<_, Bank>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database("list banks", e))
    }

    async fn create(&self, bank: &Bank) -> Result<Bank> {
        sqlx::query("INSERT INTO banks (id, name, image, bank_code) VALUES (?, ?, ?, ?)")
            .bind(&bank.id)
            .bind(&bank.name)
            .bind(&bank.image)
            .bind(&bank.bank_code)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::map_write_error(e, &bank.bank_code, "create bank"))?;

        self.find_by_id(&bank.id)
            .await?
            .ok_or_else(|| AppError::internal("Bank was created but not found"))
    }

    async fn update(&self, bank: &Bank) -> Result<Bank> {
        let result = sqlx::query(
            "UPDATE banks SET name = ?, image = ?, bank_code = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&bank.name)
        .bind(&bank.image)
        .bind(&bank.bank_code)
        .bind(&bank.id)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, &bank.bank_code, "update bank"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Bank '{}' not found", bank.id)));
        }

        self.find_by_id(&bank.id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Bank '{}' not found", bank.id)))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE banks SET deleted_at = CURRENT_TIMESTAMP WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database("delete bank", e))?;

        Ok(result.rows_affected() > 0)
    }
}
