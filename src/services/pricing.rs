// src/services/pricing.rs
//
// Deposit pricing: how many days a deposit is billed for and what it costs.
// Pure functions only; the goods service owns lookup and persistence.

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use thiserror::Error;

use crate::models::goods::PriceQuote;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("quantity must be at least 1")]
    NonPositiveQuantity,

    #[error("date out must be after date in")]
    InvalidDateRange,

    #[error("daily rate cannot be negative")]
    NegativeRate,

    #[error("category does not exist")]
    UnknownCategory,

    #[error("total price overflows")]
    Overflow,
}

impl PricingError {
    pub fn message_key(&self) -> &'static str {
        match self {
            PricingError::NonPositiveQuantity => "quantity_not_positive",
            PricingError::InvalidDateRange => "date_range_invalid",
            PricingError::NegativeRate => "rate_negative",
            PricingError::UnknownCategory => "category_unknown",
            PricingError::Overflow => "price_overflow",
        }
    }
}

/// How a deposit's duration turns into billable days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayCountPolicy {
    /// Started 24-hour intervals: 36 hours bill as 2 days.
    #[default]
    ElapsedDays,
    /// Calendar dates crossed in the report offset: 23:00 to 01:00 the
    /// next day bills as 1 day, as does a same-day stay.
    CalendarDays,
}

impl FromStr for DayCountPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "elapsed" | "elapsed_days" => Ok(DayCountPolicy::ElapsedDays),
            "calendar" | "calendar_days" => Ok(DayCountPolicy::CalendarDays),
            other => Err(format!("unknown day count policy: {other}")),
        }
    }
}

/// Billable days between `date_in` and `date_out`, never less than 1.
pub fn day_total(
    date_in: DateTime<Utc>,
    date_out: DateTime<Utc>,
    policy: DayCountPolicy,
    offset: FixedOffset,
) -> Result<i64, PricingError> {
    if date_out <= date_in {
        return Err(PricingError::InvalidDateRange);
    }

    let days = match policy {
        DayCountPolicy::ElapsedDays => {
            let span: TimeDelta = date_out - date_in;
            let secs = span.num_seconds();
            // Sub-second remainders still start a new interval
            let secs = if span.subsec_nanos() > 0 { secs + 1 } else { secs };
            (secs + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
        }
        DayCountPolicy::CalendarDays => {
            let day_in = date_in.with_timezone(&offset).date_naive();
            let day_out = date_out.with_timezone(&offset).date_naive();
            (day_out - day_in).num_days()
        }
    };

    Ok(days.max(1))
}

/// Prices a deposit: `daily_rate * quantity * day_total`.
pub fn quote(
    daily_rate: i64,
    quantity: i64,
    date_in: DateTime<Utc>,
    date_out: DateTime<Utc>,
    policy: DayCountPolicy,
    offset: FixedOffset,
) -> Result<PriceQuote, PricingError> {
    if quantity <= 0 {
        return Err(PricingError::NonPositiveQuantity);
    }
    if daily_rate < 0 {
        return Err(PricingError::NegativeRate);
    }

    let day_total = day_total(date_in, date_out, policy, offset)?;
    let total_price = daily_rate
        .checked_mul(quantity)
        .and_then(|v| v.checked_mul(day_total))
        .ok_or(PricingError::Overflow)?;

    Ok(PriceQuote { day_total, total_price })
}
