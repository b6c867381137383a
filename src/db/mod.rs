pub mod connection;
pub mod dividend;
pub mod operation;
pub mod sentiment;
pub mod user;

use chrono::{DateTime, Utc};

pub const INIT_SCHEMA: &str = r#"
-- Dividend quotes, one row per successful chain fetch
CREATE TABLE IF NOT EXISTS tao_dividends (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    netuid INTEGER,
    hotkey TEXT,
    -- u64 rao, kept as decimal text since SQLite integers are signed
    dividend TEXT NOT NULL,
    timestamp INTEGER NOT NULL
);

-- Sentiment scores, one row per pipeline run that found posts
CREATE TABLE IF NOT EXISTS sentiment_analysis (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    netuid INTEGER NOT NULL,
    sentiment_score INTEGER NOT NULL,
    tweet_count INTEGER NOT NULL,
    search_term TEXT NOT NULL,
    timestamp INTEGER NOT NULL
);

-- Stake/unstake attempts, successful or not
CREATE TABLE IF NOT EXISTS stake_operations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    netuid INTEGER NOT NULL,
    hotkey TEXT NOT NULL,
    operation_type TEXT NOT NULL,
    amount REAL NOT NULL,
    sentiment_score INTEGER NOT NULL,
    transaction_hash TEXT,
    successful BOOLEAN NOT NULL,
    error_message TEXT,
    timestamp INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT 1,
    is_admin BOOLEAN NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tao_dividends_key ON tao_dividends(netuid, hotkey, timestamp);
CREATE INDEX IF NOT EXISTS idx_sentiment_netuid_time ON sentiment_analysis(netuid, timestamp);
CREATE INDEX IF NOT EXISTS idx_stake_operations_key ON stake_operations(netuid, hotkey, timestamp);
"#;

/// Timestamps are stored as unix milliseconds
pub(crate) fn to_millis(time: &DateTime<Utc>) -> i64 {
    time.timestamp_millis()
}

pub(crate) fn from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

/// Current time at storage precision, so returned records equal stored ones
pub(crate) fn now() -> DateTime<Utc> {
    from_millis(to_millis(&Utc::now()))
}
