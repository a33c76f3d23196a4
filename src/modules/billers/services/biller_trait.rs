use crate::core::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// External bill aggregator: inquiry, payment and status lookups
#[async_trait]
pub trait BillerGateway: Send + Sync {
    /// Quote an outstanding bill for a customer
    async fn inquire(&self, request: &BillerRequest) -> Result<BillerResponse>;

    /// Ask the biller to settle a previously quoted bill
    async fn pay(&self, request: &BillerRequest) -> Result<BillerResponse>;

    /// Look up the biller-side status of a bill
    async fn status(&self, request: &BillerRequest) -> Result<BillerResponse>;

    /// Get biller name
    fn name(&self) -> &str;
}

/// Virtual-account issuer used as the top-up channel
#[async_trait]
pub trait VirtualAccountGateway: Send + Sync {
    /// Issue a static VA number for a user
    async fn generate_va(&self, request: &GenerateVaRequest) -> Result<VirtualAccountInfo>;

    /// Fetch the current state of an issued VA
    async fn va_status(&self, va_id: &str) -> Result<VirtualAccountInfo>;
}

/// Bill request sent to the aggregator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillerRequest {
    /// Biller-side customer number (meter id, membership id, ...)
    pub customer_id: String,

    /// Biller product code (e.g. `plnpost`)
    pub product_id: String,

    /// Our transaction reference
    pub partner_tx_id: String,

    /// Billing period, sent as the aggregator's free-form field
    #[serde(rename = "additional_data", skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_id: Option<String>,

    /// Requested amount (pre-paid) or zero for post-paid quotes
    pub amount: Decimal,
}

/// Normalized biller reply
///
/// Tier inputs are optional: each product reads the ones it prices on and
/// treats a missing one as a malformed reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillerResponse {
    pub partner_tx_id: String,
    #[serde(default)]
    pub tx_id: Option<String>,
    pub customer_id: String,
    pub product_id: String,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub admin_fee: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,

    // Tier inputs
    #[serde(default)]
    pub electrical_power: Option<u32>,
    #[serde(default)]
    pub usage_amount: Option<Decimal>,
    #[serde(default)]
    pub insurance_class: Option<u8>,
    #[serde(default)]
    pub family_members: Option<u32>,
    #[serde(default)]
    pub usage_m3: Option<Decimal>,
    #[serde(default)]
    pub bandwidth_mbps: Option<u32>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Static VA issuance request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateVaRequest {
    pub partner_user_id: String,
    pub bank_code: String,
    pub amount: Decimal,
    pub username_display: String,
    pub is_open: bool,
    pub is_single_use: bool,
}

/// Issued VA as reported by the aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualAccountInfo {
    pub id: String,
    pub va_number: String,
    #[serde(default)]
    pub va_status: String,
    pub bank_code: String,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub expiration_time: i64,
    #[serde(default, rename = "username_display")]
    pub name: String,
}
