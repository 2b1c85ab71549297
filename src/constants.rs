//! Policy constants for caching, remote endpoints, and the heatmap layout.
//!
//! The remote API sends no cache-control guidance, so freshness is entirely
//! a client-side policy: every request carries `Cache-Control: no-cache` and
//! the expiring cache is the sole freshness authority.

/// Cache TTL applied at every call site: 12 hours, in milliseconds.
pub const DEFAULT_CACHE_TTL_MS: i64 = 12 * 60 * 60 * 1000;

/// Cache key for the merged stock row set.
pub const STOCK_CACHE_KEY: &str = "stocks:v1";

/// Cache key prefix for per-ticker daily OHLCV data.
pub const DAILY_CACHE_PREFIX: &str = "daily:";

/// Cache key prefix for per-ticker levels-and-channel data.
pub const LEVELS_CACHE_PREFIX: &str = "levels:";

/// HTTP client timeout in seconds.
///
/// A hung request fails with a `Timeout` error instead of pending forever;
/// every coalesced caller observes the same timeout.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Default URL of the reference/info collection (symbol -> fundamentals).
pub const DEFAULT_INFO_URL: &str = "https://stock-results.vercel.app/api/info";

/// Default URL of the latest technical-indicator collection
/// ("SYMBOL.json" -> technical snapshot).
pub const DEFAULT_TECHNICAL_URL: &str = "https://stock-results.vercel.app/api/technical/latest/";

/// Host suffix for shard-specific endpoints. Per-ticker daily and levels
/// URLs are built as `https://{shard}.{suffix}/api/...`.
pub const DEFAULT_SHARD_HOST_SUFFIX: &str = "vercel.app";

/// Share of total weight the rendered treemap prefix must reach.
///
/// Bounds the heatmap to the dominant contributors instead of rendering the
/// long tail of tiny market caps.
pub const TREEMAP_WEIGHT_CUTOFF: f64 = 0.8;

/// SMA periods carried by the technical snapshot, ascending.
pub const SMA_PERIODS: [u32; 6] = [5, 10, 20, 50, 100, 200];

/// RSI thresholds used by the market summary.
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;
