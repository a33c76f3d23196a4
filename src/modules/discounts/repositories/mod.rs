use async_trait::async_trait;
use sqlx::MySqlPool;

use super::models::Discount;
use crate::core::error::{is_unique_violation, AppError};
use crate::core::Result;

/// Discount persistence
#[async_trait]
pub trait DiscountRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Discount>>;

    async fn find_by_code(&self, code: &str) -> Result<Option<Discount>>;

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Discount>>;

    /// Insert; a duplicate code yields `Conflict`
    async fn create(&self, discount: &Discount) -> Result<Discount>;

    /// Update in place; a duplicate code yields `Conflict`
    async fn update(&self, discount: &Discount) -> Result<Discount>;

    /// Soft delete; returns false when nothing matched
    async fn delete(&self, id: &str) -> Result<bool>;
}

pub struct MySqlDiscountRepository {
    pool: MySqlPool,
}

impl MySqlDiscountRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn map_write_error(err: sqlx::Error, code: &str, operation: &str) -> AppError {
        if is_unique_violation(&err) {
            AppError::conflict(format!("Discount code '{}' already exists", code))
        } else {
            AppError::database(operation, err)
        }
    }
}

const DISCOUNT_COLUMNS: &str =
    "id, discount_code, image, description, discount_price, created_at, updated_at";

#[async_trait]
impl DiscountRepository for MySqlDiscountRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Discount>> {
        let query = format!(
            "SELECT {} FROM discounts WHERE id = ? AND deleted_at IS NULL",
            DISCOUNT_COLUMNS
        );

        sqlx::query_as::<_, Discount>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database("find discount by id", e))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Discount>> {
        let query = format!(
            "SELECT {} FROM discounts WHERE discount_code = ? AND deleted_at IS NULL",
            DISCOUNT_COLUMNS
        );

        sqlx::query_as::<_, Discount>(&query)
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database("find discount by code", e))
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Discount>> {
        let query = format!(
            "SELECT {} FROM discounts WHERE deleted_at IS NULL \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
            DISCOUNT_COLUMNS
        );

        sqlx::query_as::<_, Discount>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database("list discounts", e))
    }

    async fn create(&self, discount: &Discount) -> Result<Discount> {
        sqlx::query(
            r#"
            INSERT INTO discounts (id, discount_code, image, description, discount_price)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&discount.id)
        .bind(&discount.discount_code)
        .bind(&discount.image)
        .bind(&discount.description)
        .bind(discount.discount_price)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, &discount.discount_code, "create discount"))?;

        self.find_by_id(&discount.id)
            .await?
            .ok_or_else(|| AppError::internal("Discount was created but not found"))
    }

    async fn update(&self, discount: &Discount) -> Result<Discount> {
        let result = sqlx::query(
            r#"
            UPDATE discounts
            SET discount_code = ?, image = ?, description = ?, discount_price = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(&discount.discount_code)
        .bind(&discount.image)
        .bind(&discount.description)
        .bind(discount.discount_price)
        .bind(&discount.id)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, &discount.discount_code, "update discount"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Discount '{}' not found",
                discount.id
            )));
        }

        self.find_by_id(&discount.id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Discount '{}' not found", discount.id)))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE discounts SET deleted_at = CURRENT_TIMESTAMP WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database("delete discount", e))?;

        Ok(result.rows_affected() > 0)
    }
}
