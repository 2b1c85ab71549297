use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A horizontal support/resistance price level for chart overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    /// "support" or "resistance" where the backend distinguishes them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// A price channel: upper and lower bounds at the start and end dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChannel {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub upper_start: f64,
    pub upper_end: f64,
    pub lower_start: f64,
    pub lower_end: f64,
}

/// Per-ticker levels-and-channel payload consumed by the charting view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelsChannel {
    #[serde(default)]
    pub levels: Vec<PriceLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<PriceChannel>,
}
