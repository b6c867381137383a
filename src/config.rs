// Service configuration, read once at startup:
// - HTTP listen address
// - SQLite connection string
// - Dividend cache settings (TTL, capacity)
// - Chain read API endpoint, timeout and rate limit
// - JWT secret and login token lifetime
// - Datura / Chutes / wallet signer credentials
// - Background worker pool sizing

use dotenv::dotenv;
use std::env;
use std::time::Duration;

pub const DEFAULT_SECRET_KEY: &str = "change-me-in-production";

/// Upper bound for login token lifetime (one year)
pub const MAX_TOKEN_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub cache_ttl: Duration,
    pub cache_max_capacity: u64,
    pub chain_api_url: String,
    pub chain_timeout_secs: u64,
    pub chain_rate_limit: Option<u32>,
    pub api_secret_key: String,
    pub access_token_expire_minutes: i64,
    pub bcrypt_cost: u32,
    pub datura_api_key: Option<String>,
    pub datura_api_url: String,
    pub chutes_api_key: Option<String>,
    pub chutes_api_url: String,
    pub chutes_id: String,
    pub tweet_count: usize,
    pub stake_per_point: f64,
    pub wallet_rpc_url: Option<String>,
    pub wallet_name: String,
    pub wallet_hotkey: String,
    pub default_netuid: u16,
    pub default_hotkey: String,
    pub worker_count: usize,
    pub job_queue_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data.db".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 8000,
            cache_ttl: Duration::from_secs(120),
            cache_max_capacity: 10_000,
            chain_api_url: "http://127.0.0.1:8080".to_string(),
            chain_timeout_secs: 30,
            chain_rate_limit: None,
            api_secret_key: DEFAULT_SECRET_KEY.to_string(),
            access_token_expire_minutes: 30,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            datura_api_key: None,
            datura_api_url: "https://apis.datura.ai".to_string(),
            chutes_api_key: None,
            chutes_api_url: "https://api.chutes.ai/api/v1".to_string(),
            chutes_id: "20acffc0-0c5f-58e3-97af-21fc0b261ec4".to_string(),
            tweet_count: 10,
            stake_per_point: 0.01,
            wallet_rpc_url: None,
            wallet_name: "default".to_string(),
            wallet_hotkey: "default".to_string(),
            default_netuid: 18,
            default_hotkey: "5FFApaS75bv5pJHfAp2FVLBj9ZaXuFDjEypsaBNc1wCfe52v".to_string(),
            worker_count: num_cpus::get(),
            job_queue_capacity: 100,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();
        let defaults = Self::default();

        let database_url = env::var("DATABASE_URL").unwrap_or(defaults.database_url);
        let server_host = env::var("SERVER_HOST").unwrap_or(defaults.server_host);
        let server_port = parse_var("SERVER_PORT").unwrap_or(defaults.server_port);
        let cache_ttl = parse_var("CACHE_TTL")
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_ttl);
        let cache_max_capacity =
            parse_var("CACHE_MAX_CAPACITY").unwrap_or(defaults.cache_max_capacity);
        let chain_api_url = env::var("CHAIN_API_URL").unwrap_or(defaults.chain_api_url);
        let chain_timeout_secs =
            parse_var("CHAIN_TIMEOUT_SECS").unwrap_or(defaults.chain_timeout_secs);
        let chain_rate_limit = parse_var("CHAIN_RATE_LIMIT");
        let api_secret_key = env::var("API_SECRET_KEY").unwrap_or(defaults.api_secret_key);
        let access_token_expire_minutes = parse_var("ACCESS_TOKEN_EXPIRE_MINUTES")
            .filter(|minutes: &i64| (1..=MAX_TOKEN_MINUTES).contains(minutes))
            .unwrap_or(defaults.access_token_expire_minutes);
        let bcrypt_cost = parse_var("BCRYPT_COST").unwrap_or(defaults.bcrypt_cost);
        let datura_api_key = non_empty_var("DATURA_API_KEY");
        let datura_api_url = env::var("DATURA_API_URL").unwrap_or(defaults.datura_api_url);
        let chutes_api_key = non_empty_var("CHUTES_API_KEY");
        let chutes_api_url = env::var("CHUTES_API_URL").unwrap_or(defaults.chutes_api_url);
        let chutes_id = env::var("CHUTES_ID").unwrap_or(defaults.chutes_id);
        let tweet_count = parse_var("TWEET_COUNT").unwrap_or(defaults.tweet_count);
        let stake_per_point = parse_var("STAKE_PER_POINT").unwrap_or(defaults.stake_per_point);
        let wallet_rpc_url = non_empty_var("WALLET_RPC_URL");
        let wallet_name = env::var("WALLET_NAME").unwrap_or(defaults.wallet_name);
        let wallet_hotkey = env::var("WALLET_HOTKEY").unwrap_or(defaults.wallet_hotkey);
        let default_netuid = parse_var("DEFAULT_NETUID").unwrap_or(defaults.default_netuid);
        let default_hotkey = env::var("DEFAULT_HOTKEY").unwrap_or(defaults.default_hotkey);
        let worker_count = parse_var("WORKER_COUNT")
            .filter(|count: &usize| *count > 0)
            .unwrap_or(defaults.worker_count);
        let job_queue_capacity = parse_var("JOB_QUEUE_CAPACITY")
            .filter(|cap: &usize| *cap > 0)
            .unwrap_or(defaults.job_queue_capacity);

        Self {
            database_url,
            server_host,
            server_port,
            cache_ttl,
            cache_max_capacity,
            chain_api_url,
            chain_timeout_secs,
            chain_rate_limit,
            api_secret_key,
            access_token_expire_minutes,
            bcrypt_cost,
            datura_api_key,
            datura_api_url,
            chutes_api_key,
            chutes_api_url,
            chutes_id,
            tweet_count,
            stake_per_point,
            wallet_rpc_url,
            wallet_name,
            wallet_hotkey,
            default_netuid,
            default_hotkey,
            worker_count,
            job_queue_capacity,
        }
    }

    pub fn uses_default_secret(&self) -> bool {
        self.api_secret_key == DEFAULT_SECRET_KEY
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
