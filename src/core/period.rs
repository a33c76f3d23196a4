use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Billers settle in Western Indonesia Time (UTC+7)
const JAKARTA_OFFSET_SECS: i32 = 7 * 3600;

/// Billing cycle key, formatted `<MonthName>-<Year>` (e.g. `January-2024`)
///
/// Always derived from the server clock so a request cannot pick its own period.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillingPeriod(String);

impl BillingPeriod {
    /// Period containing the given instant, evaluated in Jakarta time
    pub fn from_utc(instant: DateTime<Utc>) -> Self {
        let local = utc_to_jakarta(instant);
        BillingPeriod(local.format("%B-%Y").to_string())
    }

    /// Period for the current wall-clock time
    pub fn current() -> Self {
        Self::from_utc(Utc::now())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Convert a UTC timestamp to Asia/Jakarta
pub fn utc_to_jakarta(utc_time: DateTime<Utc>) -> DateTime<FixedOffset> {
    match FixedOffset::east_opt(JAKARTA_OFFSET_SECS) {
        Some(offset) => utc_time.with_timezone(&offset),
        None => utc_time.fixed_offset(),
    }
}
