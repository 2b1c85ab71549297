//! Remote data client: cache-then-coalesce-then-fetch for every resource.
//!
//! The merged stock row set comes from two collections fetched concurrently
//! and joined all-or-fail; per-ticker daily bars and levels payloads come
//! from shard-specific hosts. Every successful fetch is written back to the
//! expiring cache under the resource's logical key.

use crate::constants::{
    DAILY_CACHE_PREFIX, DEFAULT_CACHE_TTL_MS, DEFAULT_INFO_URL, DEFAULT_SHARD_HOST_SUFFIX,
    DEFAULT_TECHNICAL_URL, HTTP_TIMEOUT_SECS, LEVELS_CACHE_PREFIX, STOCK_CACHE_KEY,
};
use crate::error::{AppError, Result};
use crate::models::{
    DailyBar, DailyResponse, LevelsChannel, ReferenceInfo, StockRow, TechnicalSnapshot,
};
use crate::services::cache::ExpiringCache;
use crate::services::coalescer::FetchCoalescer;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Remote endpoint configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub info_url: String,
    pub technical_url: String,
    /// Shard-specific hosts are `https://{shard}.{suffix}`.
    pub shard_host_suffix: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            info_url: DEFAULT_INFO_URL.to_string(),
            technical_url: DEFAULT_TECHNICAL_URL.to_string(),
            shard_host_suffix: DEFAULT_SHARD_HOST_SUFFIX.to_string(),
        }
    }
}

impl ClientConfig {
    /// Read endpoint overrides from the environment, falling back to the
    /// defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            info_url: std::env::var("STOCKBOARD_INFO_URL").unwrap_or(defaults.info_url),
            technical_url: std::env::var("STOCKBOARD_TECHNICAL_URL")
                .unwrap_or(defaults.technical_url),
            shard_host_suffix: std::env::var("STOCKBOARD_SHARD_HOST_SUFFIX")
                .unwrap_or(defaults.shard_host_suffix),
        }
    }
}

/// Client for the screening and per-ticker endpoints.
pub struct StockClient {
    http: reqwest::Client,
    cache: ExpiringCache,
    config: ClientConfig,
    stocks_inflight: FetchCoalescer<Vec<StockRow>>,
    daily_inflight: FetchCoalescer<Vec<DailyBar>>,
    levels_inflight: FetchCoalescer<LevelsChannel>,
}

impl StockClient {
    pub fn new(cache: ExpiringCache, config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            cache,
            config,
            stocks_inflight: FetchCoalescer::new(),
            daily_inflight: FetchCoalescer::new(),
            levels_inflight: FetchCoalescer::new(),
        })
    }

    /// Fetch the merged stock row set.
    ///
    /// With `force = false` a valid cache entry is served directly. A miss
    /// (or `force = true`) runs the coalesced dual fetch; the fresh result
    /// is written back to the cache either way, refreshing the TTL window.
    pub async fn get_stock_data(&self, force: bool) -> Result<Vec<StockRow>> {
        if !force {
            if let Some(rows) = self.cache.get::<Vec<StockRow>>(STOCK_CACHE_KEY) {
                debug!(rows = rows.len(), "serving merged stock rows from cache");
                return Ok(rows);
            }
        }

        self.stocks_inflight
            .run(STOCK_CACHE_KEY, || async {
                let rows = self.fetch_merged().await?;
                self.cache.set(STOCK_CACHE_KEY, &rows, DEFAULT_CACHE_TTL_MS);
                Ok(rows)
            })
            .await
    }

    async fn fetch_merged(&self) -> Result<Vec<StockRow>> {
        info!(
            info_url = %self.config.info_url,
            technical_url = %self.config.technical_url,
            "fetching stock collections"
        );

        // All-or-fail join: a failure on either endpoint fails the merge.
        let (info, tech) = tokio::try_join!(
            self.fetch_json::<HashMap<String, ReferenceInfo>>(&self.config.info_url),
            self.fetch_json::<HashMap<String, TechnicalSnapshot>>(&self.config.technical_url),
        )?;

        let rows = merge_stock_collections(info, tech);
        info!(rows = rows.len(), "merged stock collections");
        Ok(rows)
    }

    /// Fetch daily OHLCV bars for one ticker from its database shard.
    pub async fn get_daily_data(&self, ticker: &str, shard: &str) -> Result<Vec<DailyBar>> {
        if ticker.is_empty() || shard.is_empty() {
            return Err(AppError::InvalidInput(
                "ticker and shard id are required".to_string(),
            ));
        }

        let key = format!("{DAILY_CACHE_PREFIX}{ticker}");
        if let Some(bars) = self.cache.get::<Vec<DailyBar>>(&key) {
            debug!(ticker, bars = bars.len(), "serving daily bars from cache");
            return Ok(bars);
        }

        let url = format!(
            "https://{}.{}/api/daily/{}",
            shard, self.config.shard_host_suffix, ticker
        );
        self.daily_inflight
            .run(&key, || async {
                let response: DailyResponse = self.fetch_json(&url).await?;
                self.cache.set(&key, &response.data, DEFAULT_CACHE_TTL_MS);
                Ok(response.data)
            })
            .await
    }

    /// Fetch the levels-and-channel payload for one ticker.
    pub async fn get_levels(&self, ticker: &str, shard: &str) -> Result<LevelsChannel> {
        if ticker.is_empty() || shard.is_empty() {
            return Err(AppError::InvalidInput(
                "ticker and shard id are required".to_string(),
            ));
        }

        let key = format!("{LEVELS_CACHE_PREFIX}{ticker}");
        if let Some(payload) = self.cache.get::<LevelsChannel>(&key) {
            return Ok(payload);
        }

        let url = format!(
            "https://{}.{}/api/levels/{}",
            shard, self.config.shard_host_suffix, ticker
        );
        self.levels_inflight
            .run(&key, || async {
                let payload: LevelsChannel = self.fetch_json(&url).await?;
                self.cache.set(&key, &payload, DEFAULT_CACHE_TTL_MS);
                Ok(payload)
            })
            .await
    }

    /// Drop every cached family and reset in-flight state so the next call
    /// performs a fresh fetch.
    pub fn clear_cache(&self) {
        warn!("clearing all cached stock data");
        self.cache.remove(STOCK_CACHE_KEY);
        self.cache.remove_by_prefix(DAILY_CACHE_PREFIX);
        self.cache.remove_by_prefix(LEVELS_CACHE_PREFIX);
        self.stocks_inflight.reset();
        self.daily_inflight.reset();
        self.levels_inflight.reset();
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        // The expiring cache is the sole freshness authority; bypass any
        // HTTP-level cache in front of the endpoint.
        let response = self
            .http
            .get(url)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Network(format!("GET {url} returned {status}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Parse(format!("unexpected shape from {url}: {e}")))
    }
}

/// Merge the two collections into one row per symbol.
///
/// Technical keys arrive as `"SYMBOL.json"` (or a bare symbol) and are
/// normalized by stripping the suffix. A symbol present in only one
/// collection still yields a row; within one collection, a duplicate
/// normalized symbol resolves last-writer-wins. Output is sorted by symbol
/// so repeated merges of the same input are identical.
pub fn merge_stock_collections(
    info: HashMap<String, ReferenceInfo>,
    tech: HashMap<String, TechnicalSnapshot>,
) -> Vec<StockRow> {
    let mut merged: HashMap<String, StockRow> = HashMap::with_capacity(info.len());

    for (symbol, reference) in &info {
        merged.insert(symbol.clone(), StockRow::from_reference(symbol, reference));
    }

    for (raw_key, snapshot) in &tech {
        let symbol = raw_key.strip_suffix(".json").unwrap_or(raw_key);
        merged
            .entry(symbol.to_string())
            .or_insert_with(|| StockRow::new(symbol))
            .apply_technical(snapshot);
    }

    let mut rows: Vec<StockRow> = merged.into_values().collect();
    rows.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    rows
}
