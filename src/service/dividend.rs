//! Cache-aside read path for dividend quotes.

use tracing::{error, info, warn};

use crate::blockchain::DividendSource;
use crate::cache::CacheKey;
use crate::db::dividend;
use crate::models::DividendQuote;
use crate::state::AppState;

/// One chain read. Failures are logged and read as "no value"; nothing is retried.
pub async fn fetch_dividend(
    source: &dyn DividendSource,
    netuid: Option<u16>,
    hotkey: Option<&str>,
) -> Option<u64> {
    match source.tao_dividends(netuid, hotkey).await {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            warn!("No dividend value on chain for netuid={:?}, hotkey={:?}", netuid, hotkey);
            None
        }
        Err(e) => {
            error!("Error querying TaoDividendsPerSubnet(netuid={:?}, hotkey={:?}): {}", netuid, hotkey, e);
            None
        }
    }
}

/// Serve from cache, or fetch from chain then cache and persist the result.
///
/// A hotkey without a netuid is dropped, matching the `dividend:all` key.
/// A fetch that produced no value is returned to the caller but neither
/// cached nor stored, so the next request tries the chain again.
pub async fn get_dividend(
    state: &AppState,
    netuid: Option<u16>,
    hotkey: Option<&str>,
) -> Result<DividendQuote, sqlx::Error> {
    // A hotkey is only meaningful within a subnet; without one the query
    // degenerates to every dividend, and so does the quote
    let hotkey = if netuid.is_some() { hotkey } else { None };
    let cache_key = CacheKey::dividend(netuid, hotkey);

    if let Some(mut quote) = state.cache.get(&cache_key).await {
        info!("Cache hit for {}", cache_key);
        quote.cached = true;
        return Ok(quote);
    }

    info!("Cache miss for {}, querying blockchain", cache_key);
    let value = fetch_dividend(state.dividend_source.as_ref(), netuid, hotkey).await;
    let quote = DividendQuote::fetched(netuid, hotkey.map(str::to_string), value);

    if quote.dividend.is_some() {
        state.cache.set(&cache_key, quote.clone(), None).await;
        info!("Stored data in cache with key: {}", cache_key);

        dividend::insert_quote(&state.db_pool, &quote).await?;
        info!("Stored dividend record in database for {}", cache_key);
    }

    Ok(quote)
}
