//! Unit conversion and calendar helpers for the consumption fetch.
//!
//! The portal reports volumes in cubic meters as decimal strings; callers
//! receive whole liters. Dates follow the local calendar of the caller.

use chrono::{DateTime, Duration, Local};

/// Truncates a floating-point number to an integer.
///
/// This function removes the decimal part without rounding.
///
/// # Examples
///
/// ```
/// # use suez_water_client::portal::helper::truncate_to_i64;
/// assert_eq!(truncate_to_i64(123.99), 123);
/// assert_eq!(truncate_to_i64(-123.99), -123);
/// ```
pub fn truncate_to_i64(value: f64) -> i64 {
    value.trunc() as i64
}

/// Converts cubic meters to liters, truncating to whole liters.
///
/// # Example
///
/// ```
/// # use suez_water_client::portal::helper::cubic_meters_to_liters;
/// assert_eq!(cubic_meters_to_liters(2.5), 2500);
/// assert_eq!(cubic_meters_to_liters(0.0015), 1); // Truncates, not rounds
/// ```
pub fn cubic_meters_to_liters(m3: f64) -> i64 {
    truncate_to_i64(m3 * 1000.0)
}

/// The same wall-clock time one day earlier.
pub fn yesterday(now: &DateTime<Local>) -> DateTime<Local> {
    *now - Duration::days(1)
}

/// Year and month (1-12) of the month preceding `month` of `year`.
///
/// January rolls over to December of the previous year.
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}
