use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::core::error::{is_unique_violation, AppError};
use crate::core::Result;
use crate::modules::wallet::models::VirtualAccount;

#[async_trait]
pub trait VirtualAccountRepository: Send + Sync {
    async fn find_by_user(&self, user_id: &str) -> Result<Option<VirtualAccount>>;

    /// Store a newly issued VA; if the user already has one, that one is returned
    async fn insert_or_get(&self, account: &VirtualAccount) -> Result<VirtualAccount>;
}

pub struct MySqlVirtualAccountRepository {
    pool: MySqlPool,
}

impl MySqlVirtualAccountRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VirtualAccountRepository for MySqlVirtualAccountRepository {
    async fn find_by_user(&self, user_id: &str) -> Result<Option<VirtualAccount>> {
        sqlx::query_as::<_, VirtualAccount>(
            r#"
            SELECT id, user_id, va_number, va_status, bank_code, amount,
                   expiration_time, name, created_at
            FROM virtual_accounts
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database("find virtual account", e))
    }

    async fn insert_or_get(&self, account: &VirtualAccount) -> Result<VirtualAccount> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO virtual_accounts (
                id, user_id, va_number, va_status, bank_code, amount, expiration_time, name
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.id)
        .bind(&account.user_id)
        .bind(&account.va_number)
        .bind(&account.va_status)
        .bind(&account.bank_code)
        .bind(account.amount)
        .bind(account.expiration_time)
        .bind(&account.name)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                tracing::debug!(user_id = %account.user_id, "Virtual account already exists");
            }
            Err(e) => return Err(AppError::database("insert virtual account", e)),
        }

        self.find_by_user(&account.user_id)
            .await?
            .ok_or_else(|| AppError::internal("Virtual account was stored but not found"))
    }
}
