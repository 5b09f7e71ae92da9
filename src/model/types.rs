use std::fmt;

/// Stage of the consumption fetch that produced an error.
///
/// The display form is used in error messages such as
/// `issue with previous month data`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum FetchStage {
    /// Yesterday's entry of the daily series
    Yesterday,
    /// Daily series of the current month
    ThisMonth,
    /// Daily series of the month before the current one
    PreviousMonth,
    /// Monthly totals with the yearly aggregates
    History,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FetchStage::Yesterday => write!(f, "yesterday"),
            FetchStage::ThisMonth => write!(f, "this month"),
            FetchStage::PreviousMonth => write!(f, "previous month"),
            FetchStage::History => write!(f, "history"),
        }
    }
}
