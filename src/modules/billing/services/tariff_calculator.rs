use rust_decimal::Decimal;

use crate::core::error::AppError;
use crate::core::money::round_rupiah;
use crate::modules::billing::models::PriceBreakdown;

/// PDAM tariff per cubic metre, also charged once as the fixed fee
const PDAM_RATE_PER_M3: i64 = 7450;
const PDAM_FIXED_FEE: i64 = 7450;
const PDAM_TAX: i64 = 1195;

/// Subsidy deducted once from a class 3 insurance bill
const INSURANCE_CLASS_3_SUBSIDY: i64 = 7000;

/// National health insurance membership class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsuranceClass {
    First,
    Second,
    Third,
}

impl InsuranceClass {
    /// Monthly premium per family member
    pub fn premium_per_person(&self) -> Decimal {
        match self {
            InsuranceClass::First => Decimal::new(150_000, 0),
            InsuranceClass::Second => Decimal::new(100_000, 0),
            InsuranceClass::Third => Decimal::new(35_000, 0),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            InsuranceClass::First => 1,
            InsuranceClass::Second => 2,
            InsuranceClass::Third => 3,
        }
    }
}

impl TryFrom<u8> for InsuranceClass {
    type Error = AppError;

    fn try_from(value: u8) -> Result<Self, AppError> {
        match value {
            1 => Ok(InsuranceClass::First),
            2 => Ok(InsuranceClass::Second),
            3 => Ok(InsuranceClass::Third),
            other => Err(AppError::Validation(format!(
                "Invalid insurance class: {}",
                other
            ))),
        }
    }
}

/// Tariff functions per product family plus total composition
///
/// Every function is pure; tier inputs are resolved by the caller.
pub struct TariffCalculator;

impl TariffCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Multiplier applied to electricity usage by installed power (watts)
    pub fn electricity_multiplier(&self, electrical_power: u32) -> Decimal {
        match electrical_power {
            0..=1300 => Decimal::ONE,
            1301..=3500 => Decimal::new(15, 1),
            3501..=5500 => Decimal::new(2, 0),
            _ => Decimal::new(25, 1),
        }
    }

    /// Electricity bill: usage amount × power-tier multiplier
    pub fn electricity(
        &self,
        electrical_power: u32,
        usage_amount: Decimal,
    ) -> Result<Decimal, AppError> {
        usage_amount
            .checked_mul(self.electricity_multiplier(electrical_power))
            .map(round_rupiah)
            .ok_or_else(|| out_of_range("electricity"))
    }

    /// Insurance bill: per-person premium × members, minus the class 3 subsidy
    pub fn insurance(&self, class: InsuranceClass, family_members: u32) -> Decimal {
        let gross = class.premium_per_person() * Decimal::from(family_members);

        match class {
            InsuranceClass::Third => gross - Decimal::new(INSURANCE_CLASS_3_SUBSIDY, 0),
            _ => gross,
        }
    }

    /// Water bill: metered usage plus fixed fee and tax
    pub fn pdam(&self, usage_m3: Decimal) -> Result<Decimal, AppError> {
        usage_m3
            .checked_mul(Decimal::new(PDAM_RATE_PER_M3, 0))
            .and_then(|metered| metered.checked_add(Decimal::new(PDAM_FIXED_FEE, 0)))
            .and_then(|subtotal| subtotal.checked_add(Decimal::new(PDAM_TAX, 0)))
            .map(round_rupiah)
            .ok_or_else(|| out_of_range("pdam"))
    }

    /// WiFi subscription: flat monthly fee by bandwidth (Mbps)
    pub fn wifi(&self, bandwidth_mbps: u32) -> Decimal {
        match bandwidth_mbps {
            0..=20 => Decimal::new(275_000, 0),
            21..=30 => Decimal::new(315_000, 0),
            31..=50 => Decimal::new(445_000, 0),
            _ => Decimal::new(795_000, 0),
        }
    }

    /// Compose the payable total: `price + admin_fee - discount`
    ///
    /// The applied discount is capped at `price + admin_fee`, so the total is
    /// never negative and `discount_price` records what was actually deducted.
    pub fn compose(
        &self,
        price: Decimal,
        admin_fee: Decimal,
        discount: Decimal,
    ) -> Result<PriceBreakdown, AppError> {
        if price < Decimal::ZERO {
            return Err(AppError::Validation("Price cannot be negative".to_string()));
        }
        if admin_fee < Decimal::ZERO {
            return Err(AppError::Validation(
                "Admin fee cannot be negative".to_string(),
            ));
        }
        if discount < Decimal::ZERO {
            return Err(AppError::Validation(
                "Discount cannot be negative".to_string(),
            ));
        }

        let price = round_rupiah(price);
        let admin_fee = round_rupiah(admin_fee);
        let gross = price
            .checked_add(admin_fee)
            .ok_or_else(|| AppError::Validation("Amount is out of range".to_string()))?;
        let applied_discount = round_rupiah(discount).min(gross);

        Ok(PriceBreakdown::from_parts(
            price,
            admin_fee,
            applied_discount,
            gross - applied_discount,
        ))
    }
}

fn out_of_range(tariff: &str) -> AppError {
    AppError::gateway(format!("Biller usage is out of range for the {} tariff", tariff))
}

impl Default for TariffCalculator {
    fn default() -> Self {
        Self::new()
    }
}
