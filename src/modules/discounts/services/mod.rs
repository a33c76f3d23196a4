use std::sync::Arc;

use uuid::Uuid;

use super::models::{CreateDiscountRequest, Discount, UpdateDiscountRequest};
use super::repositories::DiscountRepository;
use crate::core::{AppError, Result};

/// Discount resolution for settlement plus admin management
pub struct DiscountService {
    repository: Arc<dyn DiscountRepository>,
}

impl DiscountService {
    pub fn new(repository: Arc<dyn DiscountRepository>) -> Self {
        Self { repository }
    }

    /// Resolve a discount selected at inquiry time
    ///
    /// An empty or unknown id degrades to `Discount::none()`; storage
    /// failures still propagate.
    pub async fn resolve_by_id(&self, id: Option<&str>) -> Result<Discount> {
        let id = match id.map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => return Ok(Discount::none()),
        };

        match self.repository.find_by_id(id).await? {
            Some(discount) => Ok(discount),
            None => {
                tracing::debug!(discount_id = %id, "Discount not found, applying none");
                Ok(Discount::none())
            }
        }
    }

    /// Customer-facing lookup; a miss is reported
    pub async fn resolve_by_code(&self, code: &str) -> Result<Discount> {
        self.repository
            .find_by_code(code.trim())
            .await?
            .ok_or_else(|| AppError::not_found(format!("Discount code '{}' not found", code)))
    }

    pub async fn get(&self, id: &str) -> Result<Discount> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Discount '{}' not found", id)))
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Discount>> {
        self.repository.list(limit, offset).await
    }

    pub async fn create(&self, request: CreateDiscountRequest) -> Result<Discount> {
        request.validate()?;

        let discount = Discount {
            id: Uuid::new_v4().to_string(),
            discount_code: request.discount_code.trim().to_string(),
            image: request.image,
            description: request.description,
            discount_price: request.discount_price,
            created_at: None,
            updated_at: None,
        };

        let created = self.repository.create(&discount).await?;
        tracing::info!(discount_id = %created.id, code = %created.discount_code, "Discount created");
        Ok(created)
    }

    pub async fn update(&self, id: &str, request: UpdateDiscountRequest) -> Result<Discount> {
        request.validate()?;

        let existing = self.get(id).await?;
        let updated = self.repository.update(&request.apply_to(existing)).await?;
        tracing::info!(discount_id = %id, "Discount updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        if !self.repository.delete(id).await? {
            return Err(AppError::not_found(format!("Discount '{}' not found", id)));
        }
        tracing::info!(discount_id = %id, "Discount deleted");
        Ok(())
    }
}
