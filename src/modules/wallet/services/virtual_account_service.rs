use std::sync::Arc;

use uuid::Uuid;

use crate::core::{AppError, Result};
use crate::modules::billers::services::{GenerateVaRequest, VirtualAccountGateway, VirtualAccountInfo};
use crate::modules::wallet::models::{GenerateVaPayload, VirtualAccount};
use crate::modules::wallet::repositories::{VirtualAccountRepository, WalletRepository};

/// Issues the deposit VA each wallet tops up through
pub struct VirtualAccountService {
    accounts: Arc<dyn VirtualAccountRepository>,
    wallets: Arc<dyn WalletRepository>,
    gateway: Arc<dyn VirtualAccountGateway>,
}

impl VirtualAccountService {
    pub fn new(
        accounts: Arc<dyn VirtualAccountRepository>,
        wallets: Arc<dyn WalletRepository>,
        gateway: Arc<dyn VirtualAccountGateway>,
    ) -> Self {
        Self {
            accounts,
            wallets,
            gateway,
        }
    }

    /// Return the caller's VA, issuing one through the aggregator on first use
    pub async fn generate(&self, user_id: &str, payload: GenerateVaPayload) -> Result<VirtualAccount> {
        if payload.bank_code.trim().is_empty() {
            return Err(AppError::validation("bank_code cannot be empty"));
        }

        let user = self
            .wallets
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("unauthorized"))?;

        if let Some(existing) = self.accounts.find_by_user(&user.id).await? {
            return Ok(existing);
        }

        let issued = self
            .gateway
            .generate_va(&GenerateVaRequest {
                partner_user_id: user.id.clone(),
                bank_code: payload.bank_code.trim().to_string(),
                amount: payload.amount,
                username_display: user.name.clone(),
                is_open: true,
                is_single_use: false,
            })
            .await?;

        // The aggregator's id is what status lookups are keyed on
        let id = if issued.id.trim().is_empty() {
            Uuid::new_v4().to_string()
        } else {
            issued.id
        };

        let account = VirtualAccount {
            id,
            user_id: user.id.clone(),
            va_number: issued.va_number,
            va_status: issued.va_status,
            bank_code: issued.bank_code,
            amount: issued.amount,
            expiration_time: issued.expiration_time,
            name: if issued.name.is_empty() { user.name } else { issued.name },
            created_at: None,
        };

        let stored = self.accounts.insert_or_get(&account).await?;
        tracing::info!(user_id = %stored.user_id, va_number = %stored.va_number, "Virtual account issued");
        Ok(stored)
    }

    /// Aggregator status of the caller's own VA
    ///
    /// Ids belonging to other users are reported as not found.
    pub async fn status(&self, user_id: &str, va_id: &str) -> Result<VirtualAccountInfo> {
        let va_id = va_id.trim();
        if va_id.is_empty() {
            return Err(AppError::validation("VA id cannot be empty"));
        }

        let account = self
            .accounts
            .find_by_user(user_id)
            .await?
            .filter(|account| account.id == va_id)
            .ok_or_else(|| {
                tracing::warn!(user_id = %user_id, va_id = %va_id, "VA status requested for unowned account");
                AppError::not_found("Virtual account")
            })?;

        self.gateway.va_status(&account.id).await
    }
}
