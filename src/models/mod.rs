mod daily_bar;
mod levels;
mod stock_row;
pub mod indicators;

pub use daily_bar::{DailyBar, DailyResponse};
pub use levels::{LevelsChannel, PriceChannel, PriceLevel};
pub use stock_row::{alignment_from_ranks, ReferenceInfo, StockRow, TechnicalSnapshot};
