//! Dividend quote cache implementation using Moka

use std::time::{Duration, Instant};

use moka::{future::Cache, Expiry};
use tracing::debug;

use super::keys::CacheKey;
use crate::models::DividendQuote;

/// A cached quote together with the TTL it was stored with
#[derive(Debug, Clone)]
struct Entry {
    quote: DividendQuote,
    ttl: Duration,
}

/// Expires every entry after the TTL it was inserted with
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Short-lived cache for dividend quotes.
///
/// Reads and writes never fail: the backing store is in-process, and a
/// lookup that finds nothing usable is simply a miss.
#[derive(Clone)]
pub struct DividendCache {
    cache: Cache<String, Entry>,
    default_ttl: Duration,
}

impl DividendCache {
    pub fn new(capacity: u64, default_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { cache, default_ttl }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Get a cached quote
    pub async fn get(&self, key: &CacheKey) -> Option<DividendQuote> {
        let result = self.cache.get(&key.to_string()).await.map(|entry| entry.quote);
        if result.is_some() {
            debug!("Cache hit for key: {}", key);
        } else {
            debug!("Cache miss for key: {}", key);
        }
        result
    }

    /// Store a quote; `None` uses the default TTL
    pub async fn set(&self, key: &CacheKey, quote: DividendQuote, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        self.cache.insert(key.to_string(), Entry { quote, ttl }).await;
        debug!("Cached {} with TTL: {:?}", key, ttl);
    }
}
