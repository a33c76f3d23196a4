use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::core::{AppError, Result};

/// Bank supported for VA issuance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Bank {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub bank_code: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BankRequest {
    pub name: String,
    pub bank_code: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl BankRequest {
    pub fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        require("bank_code", &self.bank_code)
    }
}

/// Electricity / insurance / PDAM / WiFi provider listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct BillerProduct {
    pub id: String,
    pub product_type: String,
    pub provider_name: String,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BillerProductRequest {
    pub product_type: String,
    pub provider_name: String,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl BillerProductRequest {
    pub fn validate(&self) -> Result<()> {
        match self.product_type.as_str() {
            "electricity" | "electricity_token" | "insurance" | "pdam" | "wifi" => {}
            other => {
                return Err(AppError::validation(format!(
                    "Unsupported biller product type: {}",
                    other
                )))
            }
        }
        require("provider_name", &self.provider_name)?;
        require("code", &self.code)?;
        require("name", &self.name)
    }
}

/// Mobile credit or data package sold at a fixed price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PulsaProduct {
    pub id: String,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub code: String,
    pub provider: String,
    pub price: Decimal,
    pub is_active: bool,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub const PULSA_KIND: &str = "pulsa";
pub const DATA_KIND: &str = "data";

#[derive(Debug, Clone, Deserialize)]
pub struct PulsaProductRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub code: String,
    pub provider: String,
    pub price: Decimal,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl PulsaProductRequest {
    pub fn validate(&self) -> Result<()> {
        if self.kind != PULSA_KIND && self.kind != DATA_KIND {
            return Err(AppError::validation(format!(
                "Package type must be '{}' or '{}'",
                PULSA_KIND, DATA_KIND
            )));
        }
        require("name", &self.name)?;
        require("code", &self.code)?;
        require("provider", &self.provider)?;
        crate::core::money::validate_amount("price", self.price)
    }
}

/// Listing filter for pulsa/data packages
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PulsaProductQuery {
    /// Provider is detected from the number's prefix when given
    pub phone_number: Option<String>,
    pub provider: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

fn default_active() -> bool {
    true
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}
