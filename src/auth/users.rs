use sqlx::SqlitePool;
use tracing::info;

use super::password::{hash_password, verify_password};
use super::token::{Claims, JwtKeys};
use crate::api::error::ApiError;
use crate::db::user;
use crate::models::{RegisterRequest, TokenResponse, UserAccount};
use crate::validation::validate_registration;

/// Register a new account. `Ok(None)` when the email or username is taken.
pub async fn register(
    pool: &SqlitePool,
    request: &RegisterRequest,
    bcrypt_cost: u32,
) -> Result<Option<UserAccount>, ApiError> {
    validate_registration(&request.email, &request.username, &request.password)?;

    let email = request.email.trim().to_lowercase();
    let username = request.username.trim();

    if user::find_by_email(pool, &email).await?.is_some()
        || user::find_by_username(pool, username).await?.is_some()
    {
        return Ok(None);
    }

    let password_hash = hash_password(&request.password, bcrypt_cost).await?;
    let created = user::create_user(pool, &email, username, &password_hash).await?;

    if let Some(account) = &created {
        info!("Registered user {} (id {})", account.username, account.id);
    }
    Ok(created)
}

/// `Ok(None)` for an unknown user or a wrong password.
pub async fn authenticate(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<Option<UserAccount>, ApiError> {
    let Some(account) = user::find_by_username(pool, username).await? else {
        info!("Login attempt for unknown user: {}", username);
        return Ok(None);
    };

    if !verify_password(password, &account.password_hash).await? {
        info!("Password verification failed for user: {}", username);
        return Ok(None);
    }

    Ok(Some(account))
}

pub fn issue_login_token(
    keys: &JwtKeys,
    account: &UserAccount,
    lifetime_minutes: i64,
) -> Result<TokenResponse, ApiError> {
    let claims = Claims::for_minutes(
        Some(account.username.clone()),
        Some(account.id.to_string()),
        lifetime_minutes,
    )
    .map_err(|e| ApiError::Internal(e.to_string()))?;
    let access_token = keys
        .issue(&claims)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_at: claims.expires_at(),
    })
}
