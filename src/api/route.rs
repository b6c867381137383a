use crate::{
    api::{error::ApiError, response::with_total_count},
    auth::{users, Authenticated},
    db::{operation, sentiment},
    models::{
        DividendResponse, LoginForm, OperationsResponse, RegisterRequest,
        SentimentHistoryResponse, TokenResponse, UserResponse,
    },
    service,
    state::AppState,
    validation::validate_hotkey,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

// GET /api/v1/tao_dividends query parameters
#[derive(Debug, Deserialize)]
pub struct DividendsQuery {
    pub netuid: Option<u16>,
    pub hotkey: Option<String>,
    #[serde(default)]
    pub trade: bool,
}

// GET /api/v1/operations query parameters
#[derive(Debug, Deserialize)]
pub struct OperationsQuery {
    pub netuid: Option<u16>,
    pub hotkey: Option<String>,
}

// GET /api/v1/sentiment query parameters
#[derive(Debug, Deserialize)]
pub struct SentimentQuery {
    pub netuid: u16,
}

// Create router with all routes
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/tao_dividends", get(get_tao_dividends))
        .route("/operations", get(get_operations))
        .route("/sentiment", get(get_sentiment))
        .route("/register", post(register_user))
        .route("/login", post(login_for_access_token));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", api)
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Tao dividend service" }))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

// GET /api/v1/tao_dividends handler
async fn get_tao_dividends(
    State(state): State<Arc<AppState>>,
    _auth: Authenticated,
    Query(params): Query<DividendsQuery>,
) -> Result<Json<DividendResponse>, ApiError> {
    if let Some(hotkey) = params.hotkey.as_deref() {
        validate_hotkey(hotkey)?;
    }

    info!("Fetching dividends for netuid={:?}, hotkey={:?}, trade={}", params.netuid, params.hotkey, params.trade);

    let quote = service::get_dividend(&state, params.netuid, params.hotkey.as_deref()).await?;

    let stake_tx_triggered = if params.trade {
        let netuid = params.netuid.unwrap_or(state.config.default_netuid);
        let hotkey = params
            .hotkey
            .as_deref()
            .unwrap_or(&state.config.default_hotkey);

        info!("Triggering sentiment analysis and stake for netuid={}, hotkey={}", netuid, hotkey);

        // The handle is dropped: the job outlives this request
        match state.jobs.submit(netuid, hotkey).await {
            Ok(_handle) => true,
            Err(e) => {
                warn!("Stake job not queued: {}", e);
                false
            }
        }
    } else {
        false
    };

    Ok(Json(DividendResponse {
        quote,
        stake_tx_triggered,
    }))
}

// GET /api/v1/operations handler
async fn get_operations(
    State(state): State<Arc<AppState>>,
    _auth: Authenticated,
    Query(params): Query<OperationsQuery>,
) -> Result<Response, ApiError> {
    if let Some(hotkey) = params.hotkey.as_deref() {
        validate_hotkey(hotkey)?;
    }

    let operations =
        operation::get_operations(&state.db_pool, params.netuid, params.hotkey.as_deref()).await?;
    let count = operations.len();

    Ok(with_total_count(OperationsResponse { operations }, count))
}

// GET /api/v1/sentiment handler
async fn get_sentiment(
    State(state): State<Arc<AppState>>,
    _auth: Authenticated,
    Query(params): Query<SentimentQuery>,
) -> Result<Response, ApiError> {
    let sentiment_history = sentiment::get_records(&state.db_pool, params.netuid).await?;
    let count = sentiment_history.len();

    Ok(with_total_count(SentimentHistoryResponse { sentiment_history }, count))
}

// POST /api/v1/register handler
async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let Some(account) = users::register(&state.db_pool, &request, state.config.bcrypt_cost).await? else {
        return Err(ApiError::BadRequest("Username or email already exists".to_string()));
    };

    Ok((StatusCode::CREATED, Json(UserResponse::from(&account))).into_response())
}

// POST /api/v1/login handler (form-encoded username/password)
async fn login_for_access_token(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Some(account) = users::authenticate(&state.db_pool, &form.username, &form.password).await? else {
        return Err(ApiError::Unauthorized("Incorrect username or password".to_string()));
    };

    if !account.is_active {
        return Err(ApiError::BadRequest("Inactive user".to_string()));
    }

    let token = users::issue_login_token(
        &state.jwt,
        &account,
        state.config.access_token_expire_minutes,
    )?;
    info!("User {} logged in", account.username);

    Ok(Json(token))
}
