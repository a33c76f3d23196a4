use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::core::{AppError, Result};

/// Flat-amount discount selectable at inquiry time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Discount {
    pub id: String,
    pub discount_code: String,
    pub image: Option<String>,
    pub description: Option<String>,
    pub discount_price: Decimal,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Discount {
    /// Zero-value discount used when none is selected or the id does not resolve
    pub fn none() -> Self {
        Self {
            id: String::new(),
            discount_code: String::new(),
            image: None,
            description: None,
            discount_price: Decimal::ZERO,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_none(&self) -> bool {
        self.id.is_empty()
    }

    /// Id to record in a transaction snapshot
    pub fn snapshot_id(&self) -> Option<String> {
        if self.is_none() {
            None
        } else {
            Some(self.id.clone())
        }
    }
}

/// Admin request to create a discount
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDiscountRequest {
    pub discount_code: String,
    pub discount_price: Decimal,
    pub image: Option<String>,
    pub description: Option<String>,
}

/// Admin request to update a discount; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDiscountRequest {
    pub discount_code: Option<String>,
    pub discount_price: Option<Decimal>,
    pub image: Option<String>,
    pub description: Option<String>,
}

impl CreateDiscountRequest {
    pub fn validate(&self) -> Result<()> {
        validate_code(&self.discount_code)?;
        validate_price(self.discount_price)
    }
}

impl UpdateDiscountRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(code) = &self.discount_code {
            validate_code(code)?;
        }
        if let Some(price) = self.discount_price {
            validate_price(price)?;
        }
        Ok(())
    }

    /// Merge into an existing discount
    pub fn apply_to(self, mut discount: Discount) -> Discount {
        if let Some(code) = self.discount_code {
            discount.discount_code = code.trim().to_string();
        }
        if let Some(price) = self.discount_price {
            discount.discount_price = price;
        }
        if self.image.is_some() {
            discount.image = self.image;
        }
        if self.description.is_some() {
            discount.description = self.description;
        }
        discount
    }
}

fn validate_code(code: &str) -> Result<()> {
    if code.trim().is_empty() {
        return Err(AppError::validation("Discount code cannot be empty"));
    }
    if code.len() > 100 {
        return Err(AppError::validation(
            "Discount code cannot exceed 100 characters",
        ));
    }
    Ok(())
}

fn validate_price(price: Decimal) -> Result<()> {
    if price < Decimal::ZERO {
        return Err(AppError::validation("Discount price cannot be negative"));
    }
    if price.normalize().scale() > 0 {
        return Err(AppError::validation(
            "Discount price must be a whole Rupiah amount",
        ));
    }
    Ok(())
}
