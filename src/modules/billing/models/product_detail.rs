use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::BillingPeriod;

/// Product snapshot embedded in a transaction
///
/// Stored as JSON. `period` and `customer_id` sit at the top level of the
/// object so the storage layer can index them for the period guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "product_family", rename_all = "snake_case")]
pub enum ProductDetail {
    Electricity(ElectricityDetail),
    Insurance(InsuranceDetail),
    Pdam(PdamDetail),
    Wifi(WifiDetail),
    Pulsa(PulsaDetail),
    Topup(TopupDetail),
    Transfer(TransferDetail),
}

impl ProductDetail {
    /// Billing period for period-guarded bills
    pub fn period(&self) -> Option<&BillingPeriod> {
        match self {
            ProductDetail::Electricity(d) => d.period.as_ref(),
            ProductDetail::Insurance(d) => Some(&d.period),
            ProductDetail::Pdam(d) => Some(&d.period),
            ProductDetail::Wifi(d) => Some(&d.period),
            ProductDetail::Pulsa(_) | ProductDetail::Topup(_) | ProductDetail::Transfer(_) => None,
        }
    }

    /// Biller-side customer number, if the product has one
    pub fn customer_id(&self) -> Option<&str> {
        match self {
            ProductDetail::Electricity(d) => Some(&d.customer_id),
            ProductDetail::Insurance(d) => Some(&d.customer_id),
            ProductDetail::Pdam(d) => Some(&d.customer_id),
            ProductDetail::Wifi(d) => Some(&d.customer_id),
            ProductDetail::Pulsa(_) | ProductDetail::Topup(_) | ProductDetail::Transfer(_) => None,
        }
    }

    /// Biller product code for bill products
    pub fn product_code(&self) -> Option<&str> {
        match self {
            ProductDetail::Electricity(d) => Some(&d.product_code),
            ProductDetail::Insurance(d) => Some(&d.product_code),
            ProductDetail::Pdam(d) => Some(&d.product_code),
            ProductDetail::Wifi(d) => Some(&d.product_code),
            ProductDetail::Pulsa(d) => Some(&d.code),
            ProductDetail::Topup(_) | ProductDetail::Transfer(_) => None,
        }
    }

    /// Attach a pre-paid meter token; no-op for other families
    pub fn with_token(self, token: String) -> Self {
        match self {
            ProductDetail::Electricity(mut d) => {
                d.token = Some(token);
                ProductDetail::Electricity(d)
            }
            other => other,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            ProductDetail::Electricity(d) => d.token.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricityDetail {
    pub customer_id: String,
    pub customer_name: String,
    pub product_code: String,
    /// Absent for pre-paid tokens, which are not period-guarded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<BillingPeriod>,
    pub electrical_power: u32,
    pub usage_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_id: Option<String>,
    pub biller_reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceDetail {
    pub customer_id: String,
    pub customer_name: String,
    pub product_code: String,
    pub period: BillingPeriod,
    pub class: u8,
    pub family_members: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_id: Option<String>,
    pub biller_reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdamDetail {
    pub customer_id: String,
    pub customer_name: String,
    pub product_code: String,
    pub period: BillingPeriod,
    pub usage_m3: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_id: Option<String>,
    pub biller_reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WifiDetail {
    pub customer_id: String,
    pub customer_name: String,
    pub product_code: String,
    pub period: BillingPeriod,
    pub bandwidth_mbps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_id: Option<String>,
    pub biller_reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulsaDetail {
    pub phone_number: String,
    pub package_id: String,
    pub name: String,
    pub code: String,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopupDetail {
    pub aggregator_trx_id: String,
    pub va_number: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferDetail {
    pub recipient_id: String,
    pub recipient_name: String,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
