//! Synthetic daily bars for when a ticker's shard cannot be reached.
//!
//! Deterministic per ticker: the RNG is seeded from the symbol, so retries
//! and repeated renders show the same placeholder series instead of the
//! chart jumping around.

use crate::models::DailyBar;
use chrono::{Datelike, Duration, Utc, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

const LOOKBACK_DAYS: i64 = 100;

fn base_price(ticker: &str) -> f64 {
    match ticker {
        "AAPL" => 170.0,
        "GOOGL" => 135.0,
        "MSFT" => 390.0,
        "TSLA" => 260.0,
        "AMZN" => 165.0,
        "META" => 480.0,
        "NVDA" => 750.0,
        "AMD" => 175.0,
        _ => 100.0,
    }
}

/// Generate roughly 100 calendar days of weekday bars ending today, as a
/// random walk around a per-ticker base price.
pub fn synthetic_daily_bars(ticker: &str) -> Vec<DailyBar> {
    let mut hasher = DefaultHasher::new();
    ticker.hash(&mut hasher);
    let mut rng = StdRng::seed_from_u64(hasher.finish());

    let base = base_price(ticker);
    let mut price = base;
    let today = Utc::now().date_naive();

    let mut bars = Vec::new();
    for offset in (0..=LOOKBACK_DAYS).rev() {
        let date = today - Duration::days(offset);
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }

        // Daily move within ±2%, floored so the walk can't collapse.
        let change: f64 = rng.gen_range(-0.02..0.02);
        price = (price * (1.0 + change)).max(base * 0.9);

        let open = price * (1.0 + rng.gen_range(-0.005..0.005));
        let close = price;
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(10_000_000u64..60_000_000);

        bars.push(DailyBar {
            date,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    bars
}
