// Load configuration
// Set up logging
// Open the database
// Build cache, chain client, sentiment clients and wallet
// Start the stake worker pool
// Serve HTTP until ctrl-c, then drain the workers

use tao_dividend_service::{
    api,
    auth::token::JwtKeys,
    blockchain::{RpcWallet, SubtensorClient},
    cache,
    config::Config,
    db,
    sentiment::{ChutesScorer, DaturaClient},
    state::AppState,
    tasks::{PipelineSettings, SentimentPipeline, WorkerPool},
};

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting tao-dividend-service");

    let config = Config::from_env();
    if config.uses_default_secret() {
        tracing::warn!("API_SECRET_KEY not set, using the built-in development secret");
    }

    let db_pool = db::connection::establish_connection(&config.database_url).await?;
    tracing::info!("Database connection established: {}", config.database_url);

    let cache = cache::init_cache(&config);
    tracing::info!(
        "Cache initialized with TTL: {:?} and capacity: {}",
        config.cache_ttl,
        config.cache_max_capacity
    );

    let dividend_source = Arc::new(SubtensorClient::new(&config)?);

    let pipeline = Arc::new(SentimentPipeline::new(
        Arc::new(DaturaClient::new(&config)?),
        Arc::new(ChutesScorer::new(&config)?),
        Arc::new(RpcWallet::new(&config)?),
        db_pool.clone(),
        PipelineSettings {
            post_count: config.tweet_count,
            stake_per_point: config.stake_per_point,
        },
    ));
    let workers = WorkerPool::new(pipeline, config.worker_count, config.job_queue_capacity);

    let app_state = Arc::new(AppState {
        jwt: JwtKeys::from_secret(&config.api_secret_key),
        config: config.clone(),
        db_pool,
        cache,
        dividend_source,
        jobs: workers.queue(),
    });

    let app = api::create_router(app_state);
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Starting server on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    workers.shutdown().await;
    tracing::info!("Stopped");

    Ok(())
}
