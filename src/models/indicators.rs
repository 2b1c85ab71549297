//! Indicator computation over fetched daily bars.
//!
//! Display-layer math only: the heavy technical indicators arrive
//! pre-computed from the remote API; this module covers the moving-average
//! overlays drawn on candlestick charts.

use crate::models::DailyBar;
use chrono::NaiveDate;

/// One point of a moving-average overlay series.
#[derive(Debug, Clone, PartialEq)]
pub struct SmaPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Simple moving average of closing prices.
///
/// The series starts at index `period - 1`; bars inside the warm-up window
/// produce no point. A period of 0 or longer than the input yields an empty
/// series.
pub fn sma_series(bars: &[DailyBar], period: usize) -> Vec<SmaPoint> {
    if period == 0 || bars.len() < period {
        return Vec::new();
    }

    let mut points = Vec::with_capacity(bars.len() - period + 1);
    let mut window_sum: f64 = bars[..period].iter().map(|b| b.close).sum();
    points.push(SmaPoint {
        date: bars[period - 1].date,
        value: window_sum / period as f64,
    });

    for i in period..bars.len() {
        window_sum += bars[i].close - bars[i - period].close;
        points.push(SmaPoint {
            date: bars[i].date,
            value: window_sum / period as f64,
        });
    }

    points
}
