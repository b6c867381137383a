use crate::blockchain::Wallet;
use crate::db::{operation, sentiment};
use crate::db::operation::NewStakeOperation;
use crate::models::StakeOperation;
use crate::sentiment::score::StakePlan;
use crate::sentiment::{search_term, PostSource, SentimentError, SentimentScorer};
use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Posts to request per run
    pub post_count: usize,
    /// TAO staked per sentiment point
    pub stake_per_point: f64,
}

/// What one sentiment-to-stake run ended with
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// No posts matched the search term
    NoData { netuid: u16, search_term: String },
    /// Score was 0, nothing sent to the wallet
    Neutral { netuid: u16, sentiment_score: i32 },
    /// A stake or unstake was attempted and recorded; see `operation.successful`
    Executed { operation: StakeOperation },
    Failed { error: String },
}

#[derive(Error, Debug)]
enum PipelineError {
    #[error(transparent)]
    Sentiment(#[from] SentimentError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub struct SentimentPipeline {
    posts: Arc<dyn PostSource>,
    scorer: Arc<dyn SentimentScorer>,
    wallet: Arc<dyn Wallet>,
    db_pool: SqlitePool,
    settings: PipelineSettings,
}

impl SentimentPipeline {
    pub fn new(
        posts: Arc<dyn PostSource>,
        scorer: Arc<dyn SentimentScorer>,
        wallet: Arc<dyn Wallet>,
        db_pool: SqlitePool,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            posts,
            scorer,
            wallet,
            db_pool,
            settings,
        }
    }

    /// Run every stage for one (netuid, hotkey). Never fails: errors become
    /// `PipelineOutcome::Failed`.
    pub async fn run(&self, netuid: u16, hotkey: &str) -> PipelineOutcome {
        info!("Starting sentiment analysis and stake task for netuid={}, hotkey={}", netuid, hotkey);

        match self.try_run(netuid, hotkey).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Error in sentiment analysis and stake task: {}", e);
                PipelineOutcome::Failed { error: e.to_string() }
            }
        }
    }

    async fn try_run(&self, netuid: u16, hotkey: &str) -> Result<PipelineOutcome, PipelineError> {
        let term = search_term(netuid);

        let posts = self.posts.search(&term, self.settings.post_count).await?;
        if posts.is_empty() {
            warn!("No tweets found for subnet {}, skipping sentiment analysis", netuid);
            return Ok(PipelineOutcome::NoData { netuid, search_term: term });
        }

        let score = self.scorer.score(&posts).await?;
        sentiment::insert_record(&self.db_pool, netuid, score, posts.len(), &term).await?;
        info!("Sentiment score for netuid {}: {} ({} tweets)", netuid, score, posts.len());

        let Some(plan) = StakePlan::from_score(score, self.settings.stake_per_point) else {
            info!("Neutral sentiment for netuid {}, no stake operation", netuid);
            return Ok(PipelineOutcome::Neutral { netuid, sentiment_score: score });
        };

        let result = self
            .wallet
            .execute(plan.operation, netuid, hotkey, plan.amount)
            .await;

        let (transaction_hash, successful, error_message) = match result {
            Ok(receipt) => {
                info!("{} of {} TAO succeeded, tx: {:?}", plan.operation, plan.amount, receipt.tx_hash);
                (receipt.tx_hash, true, None)
            }
            Err(e) => {
                warn!("{} of {} TAO failed: {}", plan.operation, plan.amount, e);
                (None, false, Some(e.to_string()))
            }
        };

        let operation = operation::insert_operation(
            &self.db_pool,
            NewStakeOperation {
                netuid,
                hotkey: hotkey.to_string(),
                operation_type: plan.operation,
                amount: plan.amount,
                sentiment_score: score,
                transaction_hash,
                successful,
                error_message,
            },
        )
        .await?;

        Ok(PipelineOutcome::Executed { operation })
    }
}
