pub mod api;
pub mod auth;
pub mod blockchain;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod sentiment;
pub mod service;
pub mod state;
pub mod tasks;
pub mod validation;

#[cfg(test)]
pub mod tests;

// Re-export specific items for convenience
pub use api::error::ApiError;
pub use api::route::{create_router, DividendsQuery, OperationsQuery, SentimentQuery};
pub use cache::{CacheKey, DividendCache};
pub use models::{DividendQuote, SentimentRecord, StakeOperation, UserAccount};
pub use tasks::{JobQueue, PipelineOutcome, SentimentPipeline, WorkerPool};
pub use validation::{validate_hotkey, validate_registration};
