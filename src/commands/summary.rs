use crate::commands::make_client;
use crate::error::{AppError, Result};
use crate::services::summarize;
use crate::utils::format_market_cap;

pub async fn run() -> Result<()> {
    let client = make_client()?;
    let rows = client.get_stock_data(false).await?;

    let summary = summarize(&rows)
        .ok_or_else(|| AppError::NotFound("no priced rows to summarize".to_string()))?;

    println!("Stocks:           {}", summary.total_stocks);
    println!("Above 50-day SMA: {}", summary.gainers);
    println!("Below 50-day SMA: {}", summary.losers);
    println!("Avg volume:       {:.0}", summary.avg_volume);
    println!(
        "Total market cap: {}",
        format_market_cap(summary.total_market_cap)
    );
    match summary.avg_rsi {
        Some(rsi) => println!("Avg RSI-14:       {rsi:.1}"),
        None => println!("Avg RSI-14:       -"),
    }
    println!("Overbought (>70): {}", summary.overbought);
    println!("Oversold (<30):   {}", summary.oversold);

    Ok(())
}
