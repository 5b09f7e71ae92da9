//! Data types shared between the portal client and its callers.

pub mod attributes;
pub mod types;

pub use attributes::{Attributes, ATTRIBUTION};
pub use types::FetchStage;
