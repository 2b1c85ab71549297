use crate::commands::make_client;
use crate::error::{AppError, Result};
use crate::services::table::{apply, Column, Direction, Filter, SortSpec};
use crate::utils::format_market_cap;
use std::collections::{HashMap, HashSet};
use tracing::info;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    sort: String,
    desc: bool,
    stages: Vec<String>,
    min_rsi: Option<f64>,
    max_rsi: Option<f64>,
    force: bool,
    limit: usize,
) -> Result<()> {
    let column = Column::parse(&sort)
        .ok_or_else(|| AppError::InvalidInput(format!("unknown sort column '{sort}'")))?;

    let client = make_client()?;
    let rows = client.get_stock_data(force).await?;
    info!(rows = rows.len(), "loaded stock rows");

    let mut filters: HashMap<Column, Filter> = HashMap::new();
    if !stages.is_empty() {
        let allowed: HashSet<String> = stages.into_iter().collect();
        filters.insert(Column::MarketStage, Filter::OneOf(allowed));
    }
    if min_rsi.is_some() || max_rsi.is_some() {
        filters.insert(
            Column::Rsi14,
            Filter::Range {
                min: min_rsi,
                max: max_rsi,
            },
        );
    }

    let spec = SortSpec {
        column,
        direction: if desc {
            Direction::Descending
        } else {
            Direction::Ascending
        },
    };
    let selected = apply(&rows, &filters, Some(spec));

    println!(
        "{:<10} {:>12} {:>12} {:>8} {:>8} {:<12}",
        "SYMBOL", "CLOSE", "MKT CAP", "RSI", "VS SMA50", "STAGE"
    );
    for row in selected.iter().take(limit) {
        println!(
            "{:<10} {:>12} {:>12} {:>8} {:>8} {:<12}",
            row.symbol,
            row.close.map_or("-".to_string(), |v| format!("{v:.2}")),
            row.market_cap.map_or("-".to_string(), format_market_cap),
            row.rsi_14.map_or("-".to_string(), |v| format!("{v:.1}")),
            row.price_vs_sma_50_pct
                .map_or("-".to_string(), |v| format!("{v:+.1}%")),
            row.market_stage.as_deref().unwrap_or("-"),
        );
    }
    println!("{} of {} rows", selected.len().min(limit), selected.len());

    Ok(())
}
