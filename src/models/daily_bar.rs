use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily OHLCV bar. Sequences are ordered ascending by date and never
/// mutated after fetch; they feed chart rendering and SMA computation only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Wire envelope of the per-ticker daily endpoint: `{"data": [...]}`.
/// A missing `data` field decodes as an empty series.
#[derive(Debug, Clone, Deserialize)]
pub struct DailyResponse {
    #[serde(default)]
    pub data: Vec<DailyBar>,
}
