//! Shared fixtures: in-memory database, fake external services, app state.

mod auth_tests;
mod pipeline_tests;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration as ChronoDuration;
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::auth::token::{Claims, JwtKeys};
use crate::blockchain::{ClientError, DividendSource, TxReceipt, Wallet, WalletError};
use crate::cache;
use crate::config::Config;
use crate::db::connection;
use crate::models::OperationType;
use crate::sentiment::{PostSource, SentimentError, SentimentScorer, SocialPost};
use crate::state::AppState;
use crate::tasks::{PipelineSettings, SentimentPipeline, WorkerPool};

pub const TEST_SECRET: &str = "test-secret-key";
pub const HOTKEY: &str = "5FFApaS75bv5pJHfAp2FVLBj9ZaXuFDjEypsaBNc1wCfe52v";

pub fn test_config() -> Config {
    Config {
        api_secret_key: TEST_SECRET.to_string(),
        bcrypt_cost: 4,
        worker_count: 1,
        ..Config::default()
    }
}

pub async fn test_pool() -> SqlitePool {
    connection::in_memory()
        .await
        .expect("Failed to open in-memory database")
}

/// Chain read fake that counts calls
pub struct FakeChain {
    pub value: Option<u64>,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FakeChain {
    pub fn returning(value: u64) -> Arc<Self> {
        Arc::new(Self { value: Some(value), fail: false, calls: AtomicUsize::new(0) })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { value: None, fail: true, calls: AtomicUsize::new(0) })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DividendSource for FakeChain {
    async fn tao_dividends(&self, _netuid: Option<u16>, _hotkey: Option<&str>) -> Result<Option<u64>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ClientError::InvalidValue("boom".to_string()));
        }
        Ok(self.value)
    }
}

pub struct FakePosts(pub Vec<SocialPost>);

impl FakePosts {
    pub fn with(count: usize) -> Arc<Self> {
        Arc::new(Self(
            (0..count)
                .map(|i| SocialPost { id: Some(i.to_string()), text: format!("tweet {}", i) })
                .collect(),
        ))
    }
}

#[async_trait]
impl PostSource for FakePosts {
    async fn search(&self, _query: &str, count: usize) -> Result<Vec<SocialPost>, SentimentError> {
        Ok(self.0.iter().take(count).cloned().collect())
    }
}

pub struct FakeScorer(pub Result<i32, &'static str>);

#[async_trait]
impl SentimentScorer for FakeScorer {
    async fn score(&self, _posts: &[SocialPost]) -> Result<i32, SentimentError> {
        self.0.map_err(|body| SentimentError::Status { service: "Fake", status: 503, body: body.to_string() })
    }
}

/// Scorer that panics mid-run
pub struct PanickingScorer;

#[async_trait]
impl SentimentScorer for PanickingScorer {
    async fn score(&self, _posts: &[SocialPost]) -> Result<i32, SentimentError> {
        panic!("scorer blew up");
    }
}

pub type WalletCall = (OperationType, u16, String, f64);

/// Wallet fake; `Some(message)` makes every call fail with that rejection
pub struct FakeWallet {
    pub reject: Option<String>,
    pub calls: Mutex<Vec<WalletCall>>,
}

impl FakeWallet {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self { reject: None, calls: Mutex::new(Vec::new()) })
    }

    pub fn rejecting(message: &str) -> Arc<Self> {
        Arc::new(Self { reject: Some(message.to_string()), calls: Mutex::new(Vec::new()) })
    }
}

#[async_trait]
impl Wallet for FakeWallet {
    async fn execute(&self, operation: OperationType, netuid: u16, hotkey: &str, amount_tao: f64) -> Result<TxReceipt, WalletError> {
        self.calls.lock().await.push((operation, netuid, hotkey.to_string(), amount_tao));
        match &self.reject {
            Some(message) => Err(WalletError::Rejected(message.clone())),
            None => Ok(TxReceipt { tx_hash: Some("0xabc".to_string()) }),
        }
    }
}

pub fn pipeline(
    pool: &SqlitePool,
    posts: Arc<dyn PostSource>,
    scorer: Arc<dyn SentimentScorer>,
    wallet: Arc<dyn Wallet>,
) -> Arc<SentimentPipeline> {
    Arc::new(SentimentPipeline::new(
        posts,
        scorer,
        wallet,
        pool.clone(),
        PipelineSettings { post_count: 10, stake_per_point: 0.01 },
    ))
}

/// App state wired to fakes. The worker pool is returned so it stays alive.
pub async fn test_state(chain: Arc<FakeChain>, score: i32) -> (Arc<AppState>, WorkerPool) {
    let config = test_config();
    let pool = test_pool().await;
    let workers = WorkerPool::new(
        pipeline(&pool, FakePosts::with(3), Arc::new(FakeScorer(Ok(score))), FakeWallet::accepting()),
        1,
        10,
    );

    let state = Arc::new(AppState {
        jwt: JwtKeys::from_secret(&config.api_secret_key),
        cache: cache::init_cache(&config),
        config,
        db_pool: pool,
        dividend_source: chain,
        jobs: workers.queue(),
    });

    (state, workers)
}

pub fn bearer_for(secret: &str, lifetime: ChronoDuration) -> String {
    let claims = Claims::new(Some("tester".to_string()), None, lifetime).unwrap();
    let token = JwtKeys::from_secret(secret).issue(&claims).unwrap();
    format!("Bearer {}", token)
}

pub fn valid_bearer() -> String {
    bearer_for(TEST_SECRET, ChronoDuration::minutes(5))
}
