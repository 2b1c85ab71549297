use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// One merged row per ticker symbol.
///
/// Reference fields come from the info collection, technical fields from the
/// latest-technical collection; a symbol present in only one collection still
/// yields a (partially populated) row. Rows are immutable after the merge and
/// replaced wholesale by the next successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRow {
    /// Ticker symbol, unique within a merged row set.
    pub symbol: String,

    // Reference (fundamentals) fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_pe: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dividend_yield: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payout_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_margins: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_on_equity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_to_book: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earnings_growth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_debt: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cash: Option<f64>,

    // Technical snapshot fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_volume: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_vs_sma_50_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi_14: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atr_14: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atr_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_stage: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_5: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_5_diff_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_10: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_10_diff_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_20: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_20_diff_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_50: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_50_diff_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_100: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_100_diff_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_200: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_200_diff_pct: Option<f64>,

    /// SMA periods in moving-average-alignment rank order
    /// (e.g. `[200, 100, 50, 20]` for rank1=sma_200, rank2=sma_100, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma_alignment: Option<Vec<u32>>,

    /// Database shard identifier used to build per-ticker URLs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db: Option<String>,
}

impl StockRow {
    /// Create an empty row carrying only the symbol.
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            market_cap: None,
            forward_pe: None,
            dividend_yield: None,
            payout_ratio: None,
            profit_margins: None,
            return_on_equity: None,
            price_to_book: None,
            earnings_growth: None,
            total_debt: None,
            total_cash: None,
            close: None,
            volume: None,
            relative_volume: None,
            price_vs_sma_50_pct: None,
            rsi_14: None,
            atr_14: None,
            atr_pct: None,
            market_stage: None,
            sma_5: None,
            sma_5_diff_pct: None,
            sma_10: None,
            sma_10_diff_pct: None,
            sma_20: None,
            sma_20_diff_pct: None,
            sma_50: None,
            sma_50_diff_pct: None,
            sma_100: None,
            sma_100_diff_pct: None,
            sma_200: None,
            sma_200_diff_pct: None,
            ma_alignment: None,
            db: None,
        }
    }

    /// Build a row from a reference/info entry.
    pub fn from_reference(symbol: &str, info: &ReferenceInfo) -> Self {
        let mut row = Self::new(symbol);
        row.market_cap = info.market_cap;
        row.forward_pe = info.forward_pe;
        row.dividend_yield = info.dividend_yield;
        row.payout_ratio = info.payout_ratio;
        row.profit_margins = info.profit_margins;
        row.return_on_equity = info.return_on_equity;
        row.price_to_book = info.price_to_book;
        row.earnings_growth = info.earnings_growth;
        row.total_debt = info.total_debt;
        row.total_cash = info.total_cash;
        row
    }

    /// Overlay the technical snapshot onto this row. Technical fields
    /// overwrite/extend whatever the reference collection provided.
    pub fn apply_technical(&mut self, tech: &TechnicalSnapshot) {
        self.close = tech.close;
        self.volume = tech.volume;
        self.relative_volume = tech.relative_volume;
        self.price_vs_sma_50_pct = tech.price_vs_sma_50_pct;
        self.rsi_14 = tech.rsi_14;
        self.atr_14 = tech.atr_14;
        self.atr_pct = tech.atr_pct;
        self.market_stage = tech.market_stage.clone();
        self.sma_5 = tech.sma_5;
        self.sma_5_diff_pct = tech.sma_5_diff_pct;
        self.sma_10 = tech.sma_10;
        self.sma_10_diff_pct = tech.sma_10_diff_pct;
        self.sma_20 = tech.sma_20;
        self.sma_20_diff_pct = tech.sma_20_diff_pct;
        self.sma_50 = tech.sma_50;
        self.sma_50_diff_pct = tech.sma_50_diff_pct;
        self.sma_100 = tech.sma_100;
        self.sma_100_diff_pct = tech.sma_100_diff_pct;
        self.sma_200 = tech.sma_200;
        self.sma_200_diff_pct = tech.sma_200_diff_pct;
        self.ma_alignment = tech.ma_alignment.clone();
        self.db = tech.db.clone();
    }
}

/// Wire shape of one reference/info entry. Field names on the wire are
/// camelCase; all fields are optional and coerce to `None` when absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceInfo {
    pub market_cap: Option<f64>,
    #[serde(rename = "forwardPE")]
    pub forward_pe: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub payout_ratio: Option<f64>,
    pub profit_margins: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub price_to_book: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub total_debt: Option<f64>,
    pub total_cash: Option<f64>,
}

/// Wire shape of one latest-technical entry (snake_case on the wire).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TechnicalSnapshot {
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub relative_volume: Option<f64>,
    pub price_vs_sma_50_pct: Option<f64>,
    pub rsi_14: Option<f64>,
    pub atr_14: Option<f64>,
    pub atr_pct: Option<f64>,
    pub market_stage: Option<String>,
    pub sma_5: Option<f64>,
    pub sma_5_diff_pct: Option<f64>,
    pub sma_10: Option<f64>,
    pub sma_10_diff_pct: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_20_diff_pct: Option<f64>,
    pub sma_50: Option<f64>,
    pub sma_50_diff_pct: Option<f64>,
    pub sma_100: Option<f64>,
    pub sma_100_diff_pct: Option<f64>,
    pub sma_200: Option<f64>,
    pub sma_200_diff_pct: Option<f64>,
    /// Ranked alignment object: `{"rank1": "sma_200", "rank2": "sma_100", ...}`,
    /// decoded into SMA periods in rank order.
    #[serde(default, deserialize_with = "deserialize_ma_alignment")]
    pub ma_alignment: Option<Vec<u32>>,
    pub db: Option<String>,
}

fn deserialize_ma_alignment<'de, D>(deserializer: D) -> Result<Option<Vec<u32>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<HashMap<String, String>> = Option::deserialize(deserializer)?;
    Ok(raw.map(alignment_from_ranks))
}

/// Decode a rank-keyed alignment object into SMA periods in rank order.
/// Keys that don't look like `rankN` and values that don't look like `sma_P`
/// are dropped rather than failing the whole snapshot.
pub fn alignment_from_ranks(ranks: HashMap<String, String>) -> Vec<u32> {
    let mut entries: Vec<(u32, u32)> = ranks
        .iter()
        .filter_map(|(key, value)| {
            let index: u32 = key.strip_prefix("rank")?.parse().ok()?;
            let period: u32 = value.strip_prefix("sma_")?.parse().ok()?;
            Some((index, period))
        })
        .collect();
    entries.sort_by_key(|(index, _)| *index);
    entries.into_iter().map(|(_, period)| period).collect()
}
