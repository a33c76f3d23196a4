use std::str::FromStr;

use rust_decimal::Decimal;

use super::tariff_calculator::{InsuranceClass, TariffCalculator};
use crate::core::money::{format_rupiah, validate_amount};
use crate::core::{AppError, BillingPeriod, Result};
use crate::modules::billers::BillerResponse;
use crate::modules::billing::models::{
    ElectricityDetail, InsuranceDetail, PdamDetail, ProductDetail, ProductType,
    TransactionStatus, WifiDetail,
};

const CUSTOMER_ID_MIN_LEN: usize = 6;
const CUSTOMER_ID_MAX_LEN: usize = 20;

/// Bill products addressable as `/billing/{product}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillProduct {
    ElectricityPostpaid,
    ElectricityPrepaid,
    Insurance,
    Pdam,
    Wifi,
}

impl BillProduct {
    pub fn policy(&self) -> &'static ProductPolicy {
        match self {
            BillProduct::ElectricityPostpaid => &ELECTRICITY_POSTPAID,
            BillProduct::ElectricityPrepaid => &ELECTRICITY_PREPAID,
            BillProduct::Insurance => &INSURANCE,
            BillProduct::Pdam => &PDAM,
            BillProduct::Wifi => &WIFI,
        }
    }

    pub fn as_path(&self) -> &'static str {
        match self {
            BillProduct::ElectricityPostpaid => "electricity-postpaid",
            BillProduct::ElectricityPrepaid => "electricity-prepaid",
            BillProduct::Insurance => "insurance",
            BillProduct::Pdam => "pdam",
            BillProduct::Wifi => "wifi",
        }
    }
}

impl FromStr for BillProduct {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "electricity-postpaid" => Ok(BillProduct::ElectricityPostpaid),
            "electricity-prepaid" => Ok(BillProduct::ElectricityPrepaid),
            "insurance" => Ok(BillProduct::Insurance),
            "pdam" => Ok(BillProduct::Pdam),
            "wifi" => Ok(BillProduct::Wifi),
            _ => Err(AppError::not_found(format!("Unknown bill product: {}", s))),
        }
    }
}

/// Everything a policy needs to price a quote and snapshot it
pub struct QuoteContext<'a> {
    pub customer_id: &'a str,
    pub product_code: &'a str,
    /// Present only for period-guarded products
    pub period: Option<&'a BillingPeriod>,
    pub discount_id: Option<String>,
    /// Caller-chosen amount, used by pre-paid products
    pub requested_amount: Decimal,
    pub biller: &'a BillerResponse,
}

impl QuoteContext<'_> {
    fn customer_name(&self) -> String {
        self.biller.customer_name.clone().unwrap_or_default()
    }

    fn biller_reference(&self) -> String {
        self.biller
            .tx_id
            .clone()
            .unwrap_or_else(|| self.biller.partner_tx_id.clone())
    }

    fn guarded_period(&self) -> Result<BillingPeriod> {
        self.period
            .cloned()
            .ok_or_else(|| AppError::internal("Billing period missing for a guarded product"))
    }
}

type PriceFn = fn(&TariffCalculator, &QuoteContext<'_>) -> Result<Decimal>;
type DetailFn = fn(&QuoteContext<'_>) -> Result<ProductDetail>;

/// Per-product variation of the billing state machine
pub struct ProductPolicy {
    pub product_type: ProductType,
    pub id_prefix: &'static str,
    pub initial_status: TransactionStatus,
    /// One settlement per customer and period
    pub guard_period: bool,
    pub label: &'static str,
    price: PriceFn,
    build_detail: DetailFn,
}

impl ProductPolicy {
    pub fn price(&self, calculator: &TariffCalculator, ctx: &QuoteContext<'_>) -> Result<Decimal> {
        (self.price)(calculator, ctx)
    }

    pub fn build_detail(&self, ctx: &QuoteContext<'_>) -> Result<ProductDetail> {
        (self.build_detail)(ctx)
    }

    pub fn transaction_id(&self, suffix: &str) -> String {
        format!("{}{}", self.id_prefix, suffix)
    }

    pub fn describe(&self, ctx: &QuoteContext<'_>, total: Decimal) -> String {
        let mut description = format!("{} for customer {}", self.label, ctx.customer_id);
        if let Some(name) = ctx.biller.customer_name.as_deref() {
            if !name.is_empty() {
                description.push_str(&format!(" ({})", name));
            }
        }
        if let Some(period) = ctx.period {
            description.push_str(&format!(", period {}", period));
        }
        description.push_str(&format!(", total {}", format_rupiah(total)));
        description
    }
}

pub static ELECTRICITY_POSTPAID: ProductPolicy = ProductPolicy {
    product_type: ProductType::Electricity,
    id_prefix: "POSTPAID-",
    initial_status: TransactionStatus::Unpaid,
    guard_period: true,
    label: "Electricity bill",
    price: electricity_price,
    build_detail: electricity_detail,
};

pub static ELECTRICITY_PREPAID: ProductPolicy = ProductPolicy {
    product_type: ProductType::ElectricityToken,
    id_prefix: "PREPAID-",
    initial_status: TransactionStatus::Processing,
    guard_period: false,
    label: "Electricity token",
    price: requested_price,
    build_detail: electricity_detail,
};

pub static INSURANCE: ProductPolicy = ProductPolicy {
    product_type: ProductType::Insurance,
    id_prefix: "INSURANCE-",
    initial_status: TransactionStatus::Unpaid,
    guard_period: true,
    label: "Health insurance premium",
    price: insurance_price,
    build_detail: insurance_detail,
};

pub static PDAM: ProductPolicy = ProductPolicy {
    product_type: ProductType::Pdam,
    id_prefix: "PDAM-",
    initial_status: TransactionStatus::Unpaid,
    guard_period: true,
    label: "Water bill",
    price: pdam_price,
    build_detail: pdam_detail,
};

pub static WIFI: ProductPolicy = ProductPolicy {
    product_type: ProductType::Wifi,
    id_prefix: "WIFI-",
    initial_status: TransactionStatus::Unpaid,
    guard_period: true,
    label: "Internet subscription",
    price: wifi_price,
    build_detail: wifi_detail,
};

/// Biller customer numbers: digits only, 6 to 20 characters
///
/// Numbers ending in `9` are reserved by the biller for unknown accounts.
pub fn validate_customer_id(customer_id: &str) -> Result<()> {
    let valid_shape = (CUSTOMER_ID_MIN_LEN..=CUSTOMER_ID_MAX_LEN).contains(&customer_id.len())
        && customer_id.bytes().all(|b| b.is_ascii_digit());

    if !valid_shape || customer_id.ends_with('9') {
        return Err(AppError::validation("invalid customer ID"));
    }

    Ok(())
}

fn tier_input<T: Clone>(value: &Option<T>, field: &str) -> Result<T> {
    value
        .clone()
        .ok_or_else(|| AppError::gateway(format!("Biller response is missing {}", field)))
}

/// Metered usage must be present and non-negative
fn usage_input(value: &Option<Decimal>, field: &str) -> Result<Decimal> {
    let usage = tier_input(value, field)?;
    if usage < Decimal::ZERO {
        return Err(AppError::gateway(format!(
            "Biller returned negative {}: {}",
            field, usage
        )));
    }
    Ok(usage)
}

fn electricity_price(calc: &TariffCalculator, ctx: &QuoteContext<'_>) -> Result<Decimal> {
    let power = tier_input(&ctx.biller.electrical_power, "electrical_power")?;
    let usage = usage_input(&ctx.biller.usage_amount, "usage_amount")?;
    calc.electricity(power, usage)
}

fn requested_price(_calc: &TariffCalculator, ctx: &QuoteContext<'_>) -> Result<Decimal> {
    validate_amount("amount", ctx.requested_amount)?;
    Ok(ctx.requested_amount)
}

fn insurance_class(ctx: &QuoteContext<'_>) -> Result<InsuranceClass> {
    let class = tier_input(&ctx.biller.insurance_class, "insurance_class")?;
    InsuranceClass::try_from(class)
        .map_err(|_| AppError::gateway(format!("Biller returned unknown insurance class {}", class)))
}

fn insurance_price(calc: &TariffCalculator, ctx: &QuoteContext<'_>) -> Result<Decimal> {
    let class = insurance_class(ctx)?;
    let members = tier_input(&ctx.biller.family_members, "family_members")?;
    if members == 0 {
        return Err(AppError::gateway("Biller returned an insurance bill with no family members"));
    }
    Ok(calc.insurance(class, members))
}

fn pdam_price(calc: &TariffCalculator, ctx: &QuoteContext<'_>) -> Result<Decimal> {
    let usage = usage_input(&ctx.biller.usage_m3, "usage_m3")?;
    calc.pdam(usage)
}

fn wifi_price(calc: &TariffCalculator, ctx: &QuoteContext<'_>) -> Result<Decimal> {
    let bandwidth = tier_input(&ctx.biller.bandwidth_mbps, "bandwidth_mbps")?;
    Ok(calc.wifi(bandwidth))
}

fn electricity_detail(ctx: &QuoteContext<'_>) -> Result<ProductDetail> {
    // Tokens are bought by amount; the meter tier is informational there
    let (electrical_power, usage_amount) = match ctx.period {
        Some(_) => (
            tier_input(&ctx.biller.electrical_power, "electrical_power")?,
            tier_input(&ctx.biller.usage_amount, "usage_amount")?,
        ),
        None => (
            ctx.biller.electrical_power.unwrap_or_default(),
            ctx.requested_amount,
        ),
    };

    Ok(ProductDetail::Electricity(ElectricityDetail {
        customer_id: ctx.customer_id.to_string(),
        customer_name: ctx.customer_name(),
        product_code: ctx.product_code.to_string(),
        period: ctx.period.cloned(),
        electrical_power,
        usage_amount,
        token: None,
        discount_id: ctx.discount_id.clone(),
        biller_reference: ctx.biller_reference(),
    }))
}

fn insurance_detail(ctx: &QuoteContext<'_>) -> Result<ProductDetail> {
    Ok(ProductDetail::Insurance(InsuranceDetail {
        customer_id: ctx.customer_id.to_string(),
        customer_name: ctx.customer_name(),
        product_code: ctx.product_code.to_string(),
        period: ctx.guarded_period()?,
        class: insurance_class(ctx)?.as_u8(),
        family_members: tier_input(&ctx.biller.family_members, "family_members")?,
        discount_id: ctx.discount_id.clone(),
        biller_reference: ctx.biller_reference(),
    }))
}

fn pdam_detail(ctx: &QuoteContext<'_>) -> Result<ProductDetail> {
    Ok(ProductDetail::Pdam(PdamDetail {
        customer_id: ctx.customer_id.to_string(),
        customer_name: ctx.customer_name(),
        product_code: ctx.product_code.to_string(),
        period: ctx.guarded_period()?,
        usage_m3: tier_input(&ctx.biller.usage_m3, "usage_m3")?,
        address: ctx.biller.address.clone(),
        discount_id: ctx.discount_id.clone(),
        biller_reference: ctx.biller_reference(),
    }))
}

fn wifi_detail(ctx: &QuoteContext<'_>) -> Result<ProductDetail> {
    Ok(ProductDetail::Wifi(WifiDetail {
        customer_id: ctx.customer_id.to_string(),
        customer_name: ctx.customer_name(),
        product_code: ctx.product_code.to_string(),
        period: ctx.guarded_period()?,
        bandwidth_mbps: tier_input(&ctx.biller.bandwidth_mbps, "bandwidth_mbps")?,
        discount_id: ctx.discount_id.clone(),
        biller_reference: ctx.biller_reference(),
    }))
}
