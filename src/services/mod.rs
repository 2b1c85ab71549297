pub mod cache;
pub mod coalescer;
pub mod csv_export;
pub mod placeholder;
pub mod stock_client;
pub mod summary;
pub mod table;
pub mod treemap;

pub use cache::ExpiringCache;
pub use coalescer::FetchCoalescer;
pub use stock_client::{merge_stock_collections, ClientConfig, StockClient};
pub use summary::{summarize, MarketSummary};
