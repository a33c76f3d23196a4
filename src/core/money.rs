use rust_decimal::Decimal;

use crate::core::{AppError, Result};

/// Rupiah amounts carry no minor unit
pub const RUPIAH_SCALE: u32 = 0;

/// Rounds an amount to whole Rupiah (banker's rounding)
pub fn round_rupiah(amount: Decimal) -> Decimal {
    amount.round_dp(RUPIAH_SCALE)
}

/// Validates a caller-supplied amount: strictly positive, whole Rupiah
pub fn validate_amount(field: &str, amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(AppError::validation(format!("{} must be greater than 0", field)));
    }

    if amount.normalize().scale() > RUPIAH_SCALE {
        return Err(AppError::validation(format!(
            "{} must be a whole Rupiah amount, got {}",
            field, amount
        )));
    }

    Ok(())
}

/// Formats an amount for receipts and descriptions, e.g. `Rp 107.500`
pub fn format_rupiah(amount: Decimal) -> String {
    let rounded = round_rupiah(amount);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-Rp {}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}
