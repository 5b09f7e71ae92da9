use serde_derive::Serialize;
use std::collections::BTreeMap;

pub const ATTRIBUTION: &str = "Data provided by toutsurmoneau.fr";

/// Consumption figures exposed to calling applications.
///
/// Serialized key names are the contract with home-automation integrations
/// and must not change. All volumes are in liters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attributes {
    pub attribution: String,
    /// Day label to liters for the current month
    pub this_month_consumption: BTreeMap<String, i64>,
    /// Day label to liters for the previous month
    pub previous_month_consumption: BTreeMap<String, i64>,
    pub highest_monthly_consumption: i64,
    pub last_year_over_all: i64,
    pub this_year_over_all: i64,
    /// Period label to liters
    pub history: BTreeMap<String, i64>,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            attribution: ATTRIBUTION.to_string(),
            this_month_consumption: BTreeMap::new(),
            previous_month_consumption: BTreeMap::new(),
            highest_monthly_consumption: 0,
            last_year_over_all: 0,
            this_year_over_all: 0,
            history: BTreeMap::new(),
        }
    }
}
