use crate::commands::make_client;
use crate::error::{AppError, Result};
use crate::models::indicators::sma_series;
use crate::models::DailyBar;
use crate::services::placeholder::synthetic_daily_bars;
use tracing::{info, warn};

pub async fn run(ticker: &str, sma_periods: &[usize], limit: usize) -> Result<()> {
    let client = make_client()?;
    let rows = client.get_stock_data(false).await?;

    let shard = rows
        .iter()
        .find(|row| row.symbol.eq_ignore_ascii_case(ticker))
        .and_then(|row| row.db.clone())
        .ok_or_else(|| {
            AppError::NotFound(format!("no database shard known for '{ticker}'"))
        })?;

    let bars: Vec<DailyBar> = match client.get_daily_data(ticker, &shard).await {
        Ok(bars) => bars,
        Err(e) => {
            warn!(ticker, error = %e, "daily fetch failed, using synthetic bars");
            synthetic_daily_bars(ticker)
        }
    };
    info!(ticker, bars = bars.len(), "loaded daily bars");

    let start = bars.len().saturating_sub(limit);
    println!(
        "{:<12} {:>10} {:>10} {:>10} {:>10} {:>12}",
        "DATE", "OPEN", "HIGH", "LOW", "CLOSE", "VOLUME"
    );
    for bar in &bars[start..] {
        println!(
            "{:<12} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>12}",
            bar.date, bar.open, bar.high, bar.low, bar.close, bar.volume
        );
    }

    for &period in sma_periods {
        let series = sma_series(&bars, period);
        match series.last() {
            Some(point) => println!("SMA-{period}: {:.2} (as of {})", point.value, point.date),
            None => println!("SMA-{period}: not enough bars"),
        }
    }

    // Levels are a chart overlay; missing data isn't worth failing the
    // command over.
    match client.get_levels(ticker, &shard).await {
        Ok(payload) => {
            for level in &payload.levels {
                println!(
                    "Level: {:.2} {}",
                    level.price,
                    level.kind.as_deref().unwrap_or("")
                );
            }
            if let Some(channel) = &payload.channel {
                println!(
                    "Channel: {} .. {} upper {:.2}->{:.2} lower {:.2}->{:.2}",
                    channel.start_date,
                    channel.end_date,
                    channel.upper_start,
                    channel.upper_end,
                    channel.lower_start,
                    channel.lower_end
                );
            }
        }
        Err(e) => warn!(ticker, error = %e, "levels fetch failed"),
    }

    Ok(())
}
