// Records persisted by the service and the request/response bodies of the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of one dividend lookup for a (netuid, hotkey) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendQuote {
    pub netuid: Option<u16>,
    pub hotkey: Option<String>,
    pub dividend: Option<u64>,
    pub timestamp: DateTime<Utc>,
    pub cached: bool,
}

impl DividendQuote {
    pub fn fetched(netuid: Option<u16>, hotkey: Option<String>, dividend: Option<u64>) -> Self {
        Self {
            netuid,
            hotkey,
            dividend,
            timestamp: Utc::now(),
            cached: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub id: i64,
    pub netuid: u16,
    pub sentiment_score: i32,
    pub tweet_count: i64,
    pub search_term: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Stake,
    Unstake,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stake => "stake",
            Self::Unstake => "unstake",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "stake" => Some(Self::Stake),
            "unstake" => Some(Self::Unstake),
            _ => None,
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeOperation {
    pub id: i64,
    pub netuid: u16,
    pub hotkey: String,
    pub operation_type: OperationType,
    pub amount: f64,
    pub sentiment_score: i32,
    pub transaction_hash: Option<String>,
    pub successful: bool,
    pub error_message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UserAccount {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

// API request/response models

#[derive(Debug, Serialize)]
pub struct DividendResponse {
    #[serde(flatten)]
    pub quote: DividendQuote,
    pub stake_tx_triggered: bool,
}

#[derive(Debug, Serialize)]
pub struct OperationsResponse {
    pub operations: Vec<StakeOperation>,
}

#[derive(Debug, Serialize)]
pub struct SentimentHistoryResponse {
    pub sentiment_history: Vec<SentimentRecord>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&UserAccount> for UserResponse {
    fn from(user: &UserAccount) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            username: user.username.clone(),
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}
