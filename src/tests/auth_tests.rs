//! Token validation, password hashing and the register/login flow

use chrono::Duration;

use super::{test_config, test_pool, TEST_SECRET};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::{Claims, JwtKeys};
use crate::auth::users::{authenticate, issue_login_token, register};
use crate::auth::{bearer_token, AuthError};
use crate::config::Config;
use crate::models::RegisterRequest;

fn registration(email: &str, username: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        username: username.to_string(),
        password: "hunter22".to_string(),
    }
}

#[test]
fn test_token_round_trip() {
    let keys = JwtKeys::from_secret(TEST_SECRET);
    let claims = Claims::new(Some("alice".to_string()), Some("1".to_string()), Duration::minutes(5)).unwrap();

    let token = keys.issue(&claims).unwrap();
    assert_eq!(keys.verify(&token).unwrap(), claims);
}

#[test]
fn test_token_with_wrong_secret_rejected() {
    let claims = Claims::new(Some("alice".to_string()), None, Duration::minutes(5)).unwrap();
    let token = JwtKeys::from_secret("some-other-secret").issue(&claims).unwrap();

    let result = JwtKeys::from_secret(TEST_SECRET).verify(&token);
    assert!(matches!(result, Err(AuthError::InvalidToken(_))));
}

#[test]
fn test_expired_token_rejected() {
    let keys = JwtKeys::from_secret(TEST_SECRET);
    let claims = Claims::new(Some("alice".to_string()), None, Duration::seconds(-5)).unwrap();
    let token = keys.issue(&claims).unwrap();

    assert_eq!(keys.verify(&token), Err(AuthError::ExpiredToken));
}

#[test]
fn test_garbage_token_rejected() {
    let keys = JwtKeys::from_secret(TEST_SECRET);
    assert!(matches!(keys.verify("not.a.jwt"), Err(AuthError::InvalidToken(_))));
}

#[test]
fn test_bearer_header_parsing() {
    assert_eq!(bearer_token("Bearer abc"), Ok("abc"));
    assert_eq!(bearer_token("bearer abc"), Ok("abc"));
    assert_eq!(bearer_token("Token abc"), Err(AuthError::MalformedHeader));
    assert_eq!(bearer_token("Bearer"), Err(AuthError::MalformedHeader));
    assert_eq!(bearer_token("Bearer a b"), Err(AuthError::MalformedHeader));
}

#[tokio::test]
async fn test_password_hash_verifies() {
    let hash = hash_password("correct horse", 4).await.unwrap();
    assert_ne!(hash, "correct horse");
    assert!(verify_password("correct horse", &hash).await.unwrap());
    assert!(!verify_password("battery staple", &hash).await.unwrap());
    assert!(!verify_password("anything", "not-a-bcrypt-hash").await.unwrap());
}

#[tokio::test]
async fn test_register_then_authenticate() {
    let pool = test_pool().await;
    let config = test_config();

    let account = register(&pool, &registration("Alice@Example.com", "alice"), config.bcrypt_cost)
        .await
        .unwrap()
        .expect("new user");
    assert_eq!(account.email, "alice@example.com");
    assert!(account.is_active);
    assert!(!account.is_admin);

    let found = authenticate(&pool, "alice", "hunter22").await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(account.id));

    assert!(authenticate(&pool, "alice", "wrong").await.unwrap().is_none());
    assert!(authenticate(&pool, "bob", "hunter22").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_registration_rejected() {
    let pool = test_pool().await;

    assert!(register(&pool, &registration("a@example.com", "alice"), 4).await.unwrap().is_some());
    assert!(register(&pool, &registration("a@example.com", "other"), 4).await.unwrap().is_none());
    assert!(register(&pool, &registration("b@example.com", "alice"), 4).await.unwrap().is_none());
}

#[tokio::test]
async fn test_invalid_registration_rejected() {
    let pool = test_pool().await;
    assert!(register(&pool, &registration("not-an-email", "alice"), 4).await.is_err());
    assert!(register(&pool, &registration("a@example.com", "  "), 4).await.is_err());
}

#[tokio::test]
async fn test_login_token_passes_bearer_validation() {
    let pool = test_pool().await;
    let keys = JwtKeys::from_secret(TEST_SECRET);
    let account = register(&pool, &registration("c@example.com", "carol"), 4)
        .await
        .unwrap()
        .unwrap();

    let token = issue_login_token(&keys, &account, 30).unwrap();
    assert_eq!(token.token_type, "Bearer");

    let claims = keys.verify(&token.access_token).unwrap();
    assert_eq!(claims.sub.as_deref(), Some("carol"));
    assert_eq!(claims.id, Some(account.id.to_string()));
    assert_eq!(claims.expires_at(), token.expires_at);
}

#[tokio::test]
async fn test_out_of_range_lifetime_is_an_error() {
    let pool = test_pool().await;
    let keys = JwtKeys::from_secret(TEST_SECRET);
    let account = register(&pool, &registration("e@example.com", "erin"), 4)
        .await
        .unwrap()
        .unwrap();

    assert!(issue_login_token(&keys, &account, 200_000_000_000_000).is_err());
    assert_eq!(
        Claims::for_minutes(None, None, i64::MAX).unwrap_err(),
        AuthError::LifetimeOutOfRange
    );
    assert_eq!(
        Claims::new(None, None, Duration::MAX).unwrap_err(),
        AuthError::LifetimeOutOfRange
    );
}

#[test]
fn test_token_lifetime_setting_is_bounded() {
    std::env::set_var("ACCESS_TOKEN_EXPIRE_MINUTES", "200000000000000");
    let config = Config::from_env();
    std::env::remove_var("ACCESS_TOKEN_EXPIRE_MINUTES");

    assert_eq!(config.access_token_expire_minutes, Config::default().access_token_expire_minutes);
}
