use crate::error::{CostError, Result};
use chrono::{DateTime, Datelike, TimeZone, Utc};

/// Average hours in a month (8760 / 12).
pub const HOURS_PER_MONTH: f64 = 730.0;

/// Hours between two instants.
///
/// A zero-length window is valid and yields `0.0`. A window whose end precedes
/// its start is a caller error and is rejected rather than clamped.
pub fn elapsed_hours(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<f64> {
    if end < start {
        return Err(CostError::InvalidTimeWindow { start, end });
    }
    let duration = end.signed_duration_since(start);
    Ok(duration.num_milliseconds() as f64 / 3_600_000.0)
}

/// Prorates a monthly figure over `hours`.
pub fn prorate_monthly_cost(monthly_cost: f64, hours: f64, hours_per_month: f64) -> f64 {
    if hours_per_month <= 0.0 {
        return 0.0;
    }
    monthly_cost * hours / hours_per_month
}

/// First instant of the calendar month containing `at`, and of the month after.
pub fn month_bounds(at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let (year, month) = (at.year(), at.month());
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let start = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or(at);
    let end = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .unwrap_or(at);
    (start, end)
}

pub fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// `$12.34`, or four decimals for sub-cent amounts.
pub fn format_usd(amount: f64) -> String {
    if amount != 0.0 && amount.abs() < 0.01 {
        format!("${:.4}", amount)
    } else {
        format!("${:.2}", amount)
    }
}
