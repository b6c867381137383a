//! Datura twitter search client

use super::{PostSource, SentimentError, SocialPost};
use crate::config::Config;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

const SERVICE: &str = "Datura";

pub struct DaturaClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl DaturaClient {
    pub fn new(config: &Config) -> Result<Self, SentimentError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|source| SentimentError::Http { service: SERVICE, source })?;

        Ok(Self {
            http,
            api_key: config.datura_api_key.clone(),
            base_url: config.datura_api_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PostSource for DaturaClient {
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SocialPost>, SentimentError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SentimentError::NotConfigured(SERVICE))?;

        info!("Searching tweets for: {}", query);

        let today = Utc::now().date_naive();
        let yesterday = today - ChronoDuration::days(1);
        let params = [
            ("query", query.to_string()),
            ("blue_verified", "false".to_string()),
            ("is_image", "false".to_string()),
            ("is_quote", "false".to_string()),
            ("is_video", "false".to_string()),
            ("lang", "en".to_string()),
            ("min_likes", "0".to_string()),
            ("min_replies", "0".to_string()),
            ("min_retweets", "0".to_string()),
            ("sort", "Top".to_string()),
            ("start_date", yesterday.format("%Y-%m-%d").to_string()),
            ("end_date", today.format("%Y-%m-%d").to_string()),
            ("count", count.to_string()),
        ];

        let response = self
            .http
            .get(format!("{}/twitter", self.base_url))
            .header("Authorization", api_key)
            .query(&params)
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

        let body: Value = response
            .json()
            .await
            .map_err(|source| SentimentError::Http { service: SERVICE, source })?;

        let mut posts = parse_posts(&body);
        posts.truncate(count);
        if posts.is_empty() {
            warn!("No tweets found for query: {}", query);
        } else {
            info!("Fetched {} tweets for query: {}", posts.len(), query);
        }
        Ok(posts)
    }
}

/// Accepts either a bare array of tweets or `{"data": [...]}`.
/// Tweets without text are skipped.
pub fn parse_posts(body: &Value) -> Vec<SocialPost> {
    let items = match body {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => map
            .get("data")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    };

    items
        .iter()
        .filter_map(|item| {
            let text = item
                .get("text")
                .or_else(|| item.get("full_text"))
                .and_then(Value::as_str)?
                .trim();
            if text.is_empty() {
                return None;
            }
            let id = item.get("id").and_then(|id| match id {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });
            Some(SocialPost {
                id,
                text: text.to_string(),
            })
        })
        .collect()
}
