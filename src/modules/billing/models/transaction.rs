use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::str::FromStr;

use super::product_detail::ProductDetail;
use crate::core::{AppError, Result};

/// Transaction lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Bill quoted, awaiting payment
    Unpaid,

    /// Pre-paid / instant purchase awaiting completion
    Processing,

    /// Paid; terminal
    Successful,

    /// Payment rejected; terminal
    Fail,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Successful | TransactionStatus::Fail)
    }

    /// Statuses a payment may settle from
    pub const PAYABLE: [TransactionStatus; 2] =
        [TransactionStatus::Unpaid, TransactionStatus::Processing];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Unpaid => "unpaid",
            TransactionStatus::Processing => "processing",
            TransactionStatus::Successful => "successful",
            TransactionStatus::Fail => "fail",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "unpaid" => Ok(TransactionStatus::Unpaid),
            "processing" => Ok(TransactionStatus::Processing),
            "successful" => Ok(TransactionStatus::Successful),
            "fail" => Ok(TransactionStatus::Fail),
            _ => Err(AppError::validation(format!(
                "Invalid transaction status: {}",
                s
            ))),
        }
    }
}

/// Product family a transaction belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    Electricity,
    ElectricityToken,
    Insurance,
    Pdam,
    Wifi,
    Pulsa,
    Data,
    Topup,
    Transfer,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Electricity => "electricity",
            ProductType::ElectricityToken => "electricity_token",
            ProductType::Insurance => "insurance",
            ProductType::Pdam => "pdam",
            ProductType::Wifi => "wifi",
            ProductType::Pulsa => "pulsa",
            ProductType::Data => "data",
            ProductType::Topup => "topup",
            ProductType::Transfer => "transfer",
        }
    }

    /// Pre-paid electricity gets a meter token when settled
    pub fn issues_token(&self) -> bool {
        matches!(self, ProductType::ElectricityToken)
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "electricity" => Ok(ProductType::Electricity),
            "electricity_token" => Ok(ProductType::ElectricityToken),
            "insurance" => Ok(ProductType::Insurance),
            "pdam" => Ok(ProductType::Pdam),
            "wifi" => Ok(ProductType::Wifi),
            "pulsa" => Ok(ProductType::Pulsa),
            "data" => Ok(ProductType::Data),
            "topup" => Ok(ProductType::Topup),
            "transfer" => Ok(ProductType::Transfer),
            _ => Err(AppError::validation(format!("Invalid product type: {}", s))),
        }
    }
}

/// Composed price of a transaction
///
/// Built only through `TariffCalculator::compose`, which keeps
/// `total_price == price + admin_fee - discount_price`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceBreakdown {
    pub price: Decimal,
    pub admin_fee: Decimal,
    pub discount_price: Decimal,
    pub total_price: Decimal,
}

impl PriceBreakdown {
    pub(crate) fn from_parts(
        price: Decimal,
        admin_fee: Decimal,
        discount_price: Decimal,
        total_price: Decimal,
    ) -> Self {
        Self {
            price,
            admin_fee,
            discount_price,
            total_price,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.total_price == self.price + self.admin_fee - self.discount_price
    }
}

/// A billing, purchase, top-up or transfer record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub status: TransactionStatus,
    pub product_type: ProductType,
    pub product_detail: ProductDetail,
    pub description: String,
    pub price: Decimal,
    pub admin_fee: Decimal,
    pub discount_price: Decimal,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Create a new, not yet persisted transaction
    ///
    /// # Arguments
    /// * `id` - Transaction ID (product-prefixed or UUID)
    /// * `user_id` - Owning wallet
    /// * `status` - Initial status, must not be `successful` unless the record is settled on insert
    /// * `product_type` - Product family
    /// * `product_detail` - Snapshot of the product data at creation time
    /// * `description` - Human readable description
    /// * `pricing` - Composed price
    pub fn new(
        id: String,
        user_id: String,
        status: TransactionStatus,
        product_type: ProductType,
        product_detail: ProductDetail,
        description: String,
        pricing: PriceBreakdown,
    ) -> Result<Self> {
        if id.trim().is_empty() {
            return Err(AppError::validation("Transaction ID cannot be empty"));
        }

        if user_id.trim().is_empty() {
            return Err(AppError::validation("User ID cannot be empty"));
        }

        if !pricing.is_consistent() {
            return Err(AppError::internal(format!(
                "Inconsistent price breakdown for transaction {}",
                id
            )));
        }

        let now = Utc::now();
        Ok(Self {
            id,
            user_id,
            status,
            product_type,
            product_detail,
            description,
            price: pricing.price,
            admin_fee: pricing.admin_fee,
            discount_price: pricing.discount_price,
            total_price: pricing.total_price,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    pub fn pricing(&self) -> PriceBreakdown {
        PriceBreakdown::from_parts(
            self.price,
            self.admin_fee,
            self.discount_price,
            self.total_price,
        )
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// Row shape of the `transactions` table
#[derive(Debug, FromRow)]
pub struct TransactionRow {
    pub id: String,
    pub user_id: String,
    pub status: String,
    pub product_type: String,
    pub product_detail: Json<ProductDetail>,
    pub description: String,
    pub price: Decimal,
    pub admin_fee: Decimal,
    pub discount_price: Decimal,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = AppError;

    fn try_from(row: TransactionRow) -> Result<Self> {
        Ok(Transaction {
            status: row.status.parse()?,
            product_type: row.product_type.parse()?,
            id: row.id,
            user_id: row.user_id,
            product_detail: row.product_detail.0,
            description: row.description,
            price: row.price,
            admin_fee: row.admin_fee,
            discount_price: row.discount_price,
            total_price: row.total_price,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

/// Filters for transaction listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionFilter {
    pub user_id: Option<String>,
    pub status: Option<TransactionStatus>,
    pub product_type: Option<ProductType>,
    /// Matches against id and description
    pub search: Option<String>,
}

/// Successful revenue grouped by product type
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ProductRevenue {
    pub product_type: String,
    pub transaction_count: i64,
    pub total_revenue: Decimal,
}

/// Successful revenue grouped by calendar month
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct MonthlyRevenue {
    pub month: i64,
    pub transaction_count: i64,
    pub total_revenue: Decimal,
}
