pub mod chutes;
pub mod datura;
pub mod score;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use chutes::ChutesScorer;
pub use datura::DaturaClient;

#[derive(Error, Debug)]
pub enum SentimentError {
    #[error("{0} API key not configured")]
    NotConfigured(&'static str),

    #[error("{service} HTTP error: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned status {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },
}

/// A social media post used as sentiment input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialPost {
    pub id: Option<String>,
    pub text: String,
}

/// Source of recent posts about a topic
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SocialPost>, SentimentError>;
}

/// Remote scorer mapping posts to an integer in [-100, 100]
#[async_trait]
pub trait SentimentScorer: Send + Sync {
    async fn score(&self, posts: &[SocialPost]) -> Result<i32, SentimentError>;
}

pub fn search_term(netuid: u16) -> String {
    format!("Bittensor netuid {}", netuid)
}
