use crate::commands::make_client;
use crate::error::{AppError, Result};
use crate::services::csv_export::csv_from_rows;
use std::path::Path;
use tracing::info;

pub async fn run(out: &Path) -> Result<()> {
    let client = make_client()?;
    let rows = client.get_stock_data(false).await?;

    let csv = csv_from_rows(&rows)?;
    std::fs::write(out, csv)
        .map_err(|e| AppError::Io(format!("write {}: {e}", out.display())))?;

    info!(rows = rows.len(), path = %out.display(), "exported CSV");
    println!("Wrote {} rows to {}", rows.len(), out.display());
    Ok(())
}
