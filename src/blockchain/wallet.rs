//! Stake and unstake through a wallet signing service.
//!
//! The signer owns the coldkey; this side only names the wallet and hotkey to
//! act for and the amount. Calls are JSON-RPC 2.0 over HTTP:
//! `add_stake` / `remove_stake` with
//! `{wallet, wallet_hotkey, hotkey, netuid, amount_rao}`.

use crate::config::Config;
use crate::models::OperationType;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

pub const RAO_PER_TAO: f64 = 1_000_000_000.0;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Wallet signer not configured")]
    NotConfigured,

    #[error("Wallet signer HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Wallet signer rejected the operation: {0}")]
    Rejected(String),

    #[error("Invalid wallet signer response: {0}")]
    InvalidResponse(String),
}

/// Outcome of an accepted wallet operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: Option<String>,
}

#[async_trait]
pub trait Wallet: Send + Sync {
    async fn execute(
        &self,
        operation: OperationType,
        netuid: u16,
        hotkey: &str,
        amount_tao: f64,
    ) -> Result<TxReceipt, WalletError>;
}

pub fn tao_to_rao(amount_tao: f64) -> u64 {
    (amount_tao * RAO_PER_TAO).round().max(0.0) as u64
}

pub struct RpcWallet {
    http: reqwest::Client,
    url: Option<String>,
    wallet_name: String,
    wallet_hotkey: String,
    next_id: AtomicU64,
}

impl RpcWallet {
    pub fn new(config: &Config) -> Result<Self, WalletError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        if config.wallet_rpc_url.is_none() {
            warn!("WALLET_RPC_URL not set; stake operations will fail");
        }

        Ok(Self {
            http,
            url: config.wallet_rpc_url.clone(),
            wallet_name: config.wallet_name.clone(),
            wallet_hotkey: config.wallet_hotkey.clone(),
            next_id: AtomicU64::new(1),
        })
    }
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: Option<i64>,
    message: String,
}

#[async_trait]
impl Wallet for RpcWallet {
    async fn execute(
        &self,
        operation: OperationType,
        netuid: u16,
        hotkey: &str,
        amount_tao: f64,
    ) -> Result<TxReceipt, WalletError> {
        let url = self.url.as_deref().ok_or(WalletError::NotConfigured)?;
        let method = match operation {
            OperationType::Stake => "add_stake",
            OperationType::Unstake => "remove_stake",
        };
        let amount_rao = tao_to_rao(amount_tao);

        info!(
            "Submitting {} of {} TAO ({} rao) on netuid {} for hotkey {}",
            method, amount_tao, amount_rao, netuid, hotkey
        );

        let request = json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": {
                "wallet": self.wallet_name,
                "wallet_hotkey": self.wallet_hotkey,
                "hotkey": hotkey,
                "netuid": netuid,
                "amount_rao": amount_rao,
            },
        });

        let body: Value = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        receipt_from_response(body)
    }
}

/// Map a JSON-RPC response body from the signer to a receipt.
///
/// An `error` member is a rejection. The result may be a bare hash string,
/// an object carrying `tx_hash` or `extrinsic_hash`, or `true`/`null` for an
/// accepted call without a hash; `false` is a rejection.
pub fn receipt_from_response(body: Value) -> Result<TxReceipt, WalletError> {
    let response: RpcResponse =
        serde_json::from_value(body).map_err(|e| WalletError::InvalidResponse(e.to_string()))?;

    if let Some(err) = response.error {
        return Err(WalletError::Rejected(match err.code {
            Some(code) => format!("{} (code {})", err.message, code),
            None => err.message,
        }));
    }

    let result = response
        .result
        .ok_or_else(|| WalletError::InvalidResponse("missing result".to_string()))?;

    let tx_hash = match result {
        Value::String(hash) => Some(hash),
        Value::Object(map) => {
            let hash = map
                .get("tx_hash")
                .or_else(|| map.get("extrinsic_hash"))
                .and_then(Value::as_str)
                .map(str::to_string);
            if hash.is_none() {
                return Err(WalletError::InvalidResponse(Value::Object(map).to_string()));
            }
            hash
        }
        Value::Bool(true) => None,
        Value::Bool(false) => {
            return Err(WalletError::Rejected("signer reported failure".to_string()))
        }
        other => return Err(WalletError::InvalidResponse(other.to_string())),
    };

    Ok(TxReceipt { tx_hash })
}
