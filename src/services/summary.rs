//! Aggregate market statistics over a merged row set.

use crate::constants::{RSI_OVERBOUGHT, RSI_OVERSOLD};
use crate::models::StockRow;
use serde::Serialize;

/// Headline numbers for the summary cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSummary {
    pub total_stocks: usize,
    /// Rows trading above their 50-day SMA.
    pub gainers: usize,
    /// Rows trading below their 50-day SMA.
    pub losers: usize,
    pub avg_volume: f64,
    pub total_market_cap: f64,
    pub avg_rsi: Option<f64>,
    pub overbought: usize,
    pub oversold: usize,
}

/// Summarize rows that carry a close price. Returns `None` when no row
/// qualifies.
pub fn summarize(rows: &[StockRow]) -> Option<MarketSummary> {
    let priced: Vec<&StockRow> = rows.iter().filter(|r| r.close.is_some()).collect();
    if priced.is_empty() {
        return None;
    }

    let gainers = priced
        .iter()
        .filter(|r| r.price_vs_sma_50_pct.is_some_and(|p| p > 0.0))
        .count();
    let losers = priced
        .iter()
        .filter(|r| r.price_vs_sma_50_pct.is_some_and(|p| p < 0.0))
        .count();

    let volume_sum: f64 = priced.iter().filter_map(|r| r.volume).sum();
    let total_market_cap: f64 = priced.iter().filter_map(|r| r.market_cap).sum();

    let rsi_values: Vec<f64> = priced.iter().filter_map(|r| r.rsi_14).collect();
    let avg_rsi = if rsi_values.is_empty() {
        None
    } else {
        Some(rsi_values.iter().sum::<f64>() / rsi_values.len() as f64)
    };
    let overbought = rsi_values.iter().filter(|&&r| r > RSI_OVERBOUGHT).count();
    let oversold = rsi_values.iter().filter(|&&r| r < RSI_OVERSOLD).count();

    Some(MarketSummary {
        total_stocks: priced.len(),
        gainers,
        losers,
        avg_volume: volume_sum / priced.len() as f64,
        total_market_cap,
        avg_rsi,
        overbought,
        oversold,
    })
}
