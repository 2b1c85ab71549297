pub mod clear_cache;
pub mod daily;
pub mod export;
pub mod heatmap;
pub mod screen;
pub mod summary;

use crate::error::Result;
use crate::services::cache::ExpiringCache;
use crate::services::{ClientConfig, StockClient};
use crate::utils::get_cache_dir;

/// Build the client every command shares: file-backed cache in the
/// configured cache directory, endpoints from the environment.
pub fn make_client() -> Result<StockClient> {
    let cache = ExpiringCache::with_dir(get_cache_dir());
    StockClient::new(cache, ClientConfig::from_env())
}
