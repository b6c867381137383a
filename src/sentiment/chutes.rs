//! Chutes LLM sentiment scorer

use super::score::extract_score;
use super::{SentimentError, SentimentScorer, SocialPost};
use crate::config::Config;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};

const SERVICE: &str = "Chutes";

const PROMPT: &str = "Rate the overall sentiment of the following tweets about a Bittensor subnet \
on a scale from -100 (very negative) to 100 (very positive). \
Reply with JSON of the form {\"sentiment_score\": <integer>}.";

pub struct ChutesScorer {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    chute_id: String,
}

impl ChutesScorer {
    pub fn new(config: &Config) -> Result<Self, SentimentError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|source| SentimentError::Http { service: SERVICE, source })?;

        Ok(Self {
            http,
            api_key: config.chutes_api_key.clone(),
            base_url: config.chutes_api_url.trim_end_matches('/').to_string(),
            chute_id: config.chutes_id.clone(),
        })
    }
}

#[async_trait]
impl SentimentScorer for ChutesScorer {
    async fn score(&self, posts: &[SocialPost]) -> Result<i32, SentimentError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SentimentError::NotConfigured(SERVICE))?;

        if posts.is_empty() {
            warn!("No tweets provided for sentiment analysis");
            return Ok(0);
        }

        let combined = posts
            .iter()
            .map(|post| post.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let payload = json!({
            "inputs": {
                "prompt": PROMPT,
                "tweet_text": combined,
            }
        });

        let response = self
            .http
            .post(format!("{}/chutes/{}/run", self.base_url, self.chute_id))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|source| SentimentError::Http { service: SERVICE, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SentimentError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|source| SentimentError::Http { service: SERVICE, source })?;

        let score = score_response_body(text);
        info!("Sentiment analysis complete. Score: {}", score);
        Ok(score)
    }
}

/// Score a raw response body. A body that is not JSON, or is a bare JSON
/// string, is scored as plain text.
pub fn score_response_body(text: String) -> i32 {
    let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
    let body = match body {
        Value::String(text) => json!({ "text": text }),
        other => other,
    };
    extract_score(&body)
}
