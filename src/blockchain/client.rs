use crate::config::Config;
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde_json::Value;
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

const PALLET: &str = "subtensorModule";
const STORAGE_ITEM: &str = "taoDividendsPerSubnet";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Chain API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected storage value: {0}")]
    InvalidValue(String),
}

/// Read access to the `TaoDividendsPerSubnet` storage map.
#[async_trait]
pub trait DividendSource: Send + Sync {
    /// `Ok(None)` means the chain holds no value for the key.
    async fn tao_dividends(
        &self,
        netuid: Option<u16>,
        hotkey: Option<&str>,
    ) -> Result<Option<u64>, ClientError>;
}

/// Queries Subtensor storage through a Substrate API sidecar
/// (`GET /pallets/{pallet}/storage/{item}?keys[]=...`).
pub struct SubtensorClient {
    http: reqwest::Client,
    base_url: String,
    rate_limiter: Option<DefaultDirectRateLimiter>,
}

impl SubtensorClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let timeout = Duration::from_secs(config.chain_timeout_secs);
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        let rate_limiter = config
            .chain_rate_limit
            .and_then(NonZeroU32::new)
            .map(|per_sec| RateLimiter::direct(Quota::per_second(per_sec)));

        info!(
            "Initializing Subtensor client with API endpoint: {}, timeout: {:?}, rate limit: {:?}",
            config.chain_api_url, timeout, config.chain_rate_limit
        );

        Ok(Self {
            http,
            base_url: config.chain_api_url.trim_end_matches('/').to_string(),
            rate_limiter,
        })
    }

    fn storage_url(&self) -> String {
        format!("{}/pallets/{}/storage/{}", self.base_url, PALLET, STORAGE_ITEM)
    }
}

#[async_trait]
impl DividendSource for SubtensorClient {
    async fn tao_dividends(
        &self,
        netuid: Option<u16>,
        hotkey: Option<&str>,
    ) -> Result<Option<u64>, ClientError> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let mut keys: Vec<(&str, String)> = Vec::with_capacity(2);
        if let Some(netuid) = netuid {
            keys.push(("keys[]", netuid.to_string()));
        }
        if let Some(hotkey) = hotkey {
            keys.push(("keys[]", hotkey.to_string()));
        }

        debug!("Querying {} with keys {:?}", STORAGE_ITEM, keys);

        let response = self.http.get(self.storage_url()).query(&keys).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        parse_storage_value(body.get("value").unwrap_or(&Value::Null))
    }
}

/// Storage values arrive as decimal strings, hex strings or plain numbers.
pub fn parse_storage_value(value: &Value) -> Result<Option<u64>, ClientError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| ClientError::InvalidValue(n.to_string())),
        Value::String(s) => {
            let s = s.trim();
            let parsed = match s.strip_prefix("0x") {
                Some(hex) => u64::from_str_radix(hex, 16),
                None => s.parse::<u64>(),
            };
            parsed
                .map(Some)
                .map_err(|_| ClientError::InvalidValue(s.to_string()))
        }
        other => Err(ClientError::InvalidValue(other.to_string())),
    }
}
