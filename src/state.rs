use crate::auth::token::JwtKeys;
use crate::blockchain::DividendSource;
use crate::cache::DividendCache;
use crate::config::Config;
use crate::tasks::JobQueue;
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub db_pool: SqlitePool,
    pub cache: DividendCache,
    pub dividend_source: Arc<dyn DividendSource>,
    pub jobs: JobQueue,
    pub jwt: JwtKeys,
}
