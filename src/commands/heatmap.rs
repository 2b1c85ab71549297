use crate::commands::make_client;
use crate::constants::TREEMAP_WEIGHT_CUTOFF;
use crate::error::Result;
use crate::services::treemap::{color_scale, dominant_prefix, layout, TreemapItem};
use crate::utils::format_market_cap;
use tracing::info;

pub async fn run(width: f64, height: f64) -> Result<()> {
    let client = make_client()?;
    let rows = client.get_stock_data(false).await?;

    let items: Vec<TreemapItem> = rows
        .iter()
        .filter_map(|row| {
            let weight = row.market_cap?;
            Some(TreemapItem {
                id: row.symbol.clone(),
                weight,
                metric: row.price_vs_sma_50_pct,
            })
        })
        .collect();

    let dominant = dominant_prefix(items, TREEMAP_WEIGHT_CUTOFF);
    info!(tiles = dominant.len(), "laying out heatmap");
    let placed = layout(&dominant, width, height);

    let metrics: Vec<f64> = placed.iter().filter_map(|p| p.metric).collect();
    let min = metrics.iter().copied().fold(f64::INFINITY, f64::min);
    let max = metrics.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (min, max) = if metrics.is_empty() { (0.0, 0.0) } else { (min, max) };

    for tile in &placed {
        let weight = dominant
            .iter()
            .find(|i| i.id == tile.id)
            .map(|i| i.weight)
            .unwrap_or(0.0);
        let color = color_scale(tile.metric, min, max);
        println!(
            "{:<10} x={:>7.1} y={:>7.1} w={:>7.1} h={:>7.1} cap={:>8} #{:02x}{:02x}{:02x}",
            tile.id,
            tile.x,
            tile.y,
            tile.width,
            tile.height,
            format_market_cap(weight),
            color.r,
            color.g,
            color.b,
        );
    }

    Ok(())
}
