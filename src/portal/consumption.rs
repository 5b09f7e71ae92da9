//! Parsing of the portal's consumption payloads.
//!
//! Both data endpoints answer with loosely typed JSON arrays whose values
//! are cubic meters, usually encoded as strings (`"1.234"`).
//!
//! Daily series (`statJData`): one `[dayLabel, value]` pair per day of the
//! month, in day order.
//!
//! Monthly totals (`statMData`): positional, and the order is relied upon
//! as-is:
//!
//! | position        | content                                      |
//! |-----------------|----------------------------------------------|
//! | last            | highest monthly consumption                  |
//! | last - 1        | last year's overall consumption              |
//! | last - 2        | this year's overall consumption              |
//! | everything else | per-period records, value at 1, label at 3   |

use crate::error::ParseError;
use crate::portal::helper::cubic_meters_to_liters;
use serde_json::Value;
use std::collections::BTreeMap;

/// Yearly aggregates and per-period history, in liters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyTotals {
    pub highest_monthly_consumption: i64,
    pub last_year_over_all: i64,
    pub this_year_over_all: i64,
    pub history: BTreeMap<String, i64>,
}

/// Parses a response body into the top-level JSON array.
pub fn parse_series(body: &str) -> Result<Vec<Value>, ParseError> {
    match serde_json::from_str::<Value>(body)? {
        Value::Array(items) => Ok(items),
        other => Err(ParseError::unexpected(format!(
            "expected an array, got {}",
            kind_of(&other)
        ))),
    }
}

/// Liters consumed on `day` (1-31) according to a daily series.
///
/// The entry is taken at position `day - 1`. Series that do not cover the
/// whole month are looked up by their day label instead.
pub fn yesterday_liters(series: &[Value], day: u32) -> Result<i64, ParseError> {
    let index = day.saturating_sub(1) as usize;
    let entry = match series.get(index) {
        Some(entry) => entry,
        None => series
            .iter()
            .find(|entry| {
                entry
                    .get(0)
                    .map(label_of)
                    .and_then(|label| label.trim().parse::<u32>().ok())
                    == Some(day)
            })
            .ok_or(ParseError::MissingEntry { index })?,
    };
    let value = entry.get(1).ok_or_else(|| {
        ParseError::unexpected(format!("day entry without value: {}", entry))
    })?;
    liters_of(value)
}

/// Day label to liters for every entry of a daily series.
pub fn daily_consumption(series: &[Value]) -> Result<BTreeMap<String, i64>, ParseError> {
    series
        .iter()
        .map(|entry| match (entry.get(0), entry.get(1)) {
            (Some(label), Some(value)) => Ok((label_of(label), liters_of(value)?)),
            _ => Err(ParseError::unexpected(format!(
                "expected [day, value], got {}",
                entry
            ))),
        })
        .collect()
}

/// Splits the monthly totals payload into its trailing aggregates and the
/// leading history records.
pub fn monthly_totals(series: &[Value]) -> Result<MonthlyTotals, ParseError> {
    let [records @ .., this_year, last_year, highest] = series else {
        return Err(ParseError::unexpected(format!(
            "expected at least 3 trailing totals, got {} entries",
            series.len()
        )));
    };

    let history = records
        .iter()
        .map(|record| match (record.get(3), record.get(1)) {
            (Some(label), Some(value)) => Ok((label_of(label), liters_of(value)?)),
            _ => Err(ParseError::unexpected(format!(
                "history record too short: {}",
                record
            ))),
        })
        .collect::<Result<BTreeMap<_, _>, _>>()?;

    Ok(MonthlyTotals {
        highest_monthly_consumption: liters_of(highest)?,
        last_year_over_all: liters_of(last_year)?,
        this_year_over_all: liters_of(this_year)?,
        history,
    })
}

/// Converts a cubic-meter value (string or number) to liters.
pub fn liters_of(value: &Value) -> Result<i64, ParseError> {
    let m3 = match value {
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|e| ParseError::number_parse(text, e))?,
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| ParseError::number_parse(number.to_string(), "not representable"))?,
        other => {
            return Err(ParseError::number_parse(
                other.to_string(),
                format!("expected a number, got {}", kind_of(other)),
            ))
        }
    };
    Ok(cubic_meters_to_liters(m3))
}

fn label_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
