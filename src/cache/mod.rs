pub mod dividend;
pub mod keys;

use crate::config::Config;

pub use dividend::DividendCache;
pub use keys::CacheKey;

pub fn init_cache(config: &Config) -> DividendCache {
    DividendCache::new(config.cache_max_capacity, config.cache_ttl)
}
