use sqlx::{sqlite::SqliteRow, Pool, Row, Sqlite};
use crate::db::{from_millis, now, to_millis};
use crate::models::UserAccount;

/// Insert a new user. Returns `Ok(None)` when the email or username is taken.
pub async fn create_user(
    pool: &Pool<Sqlite>,
    email: &str,
    username: &str,
    password_hash: &str,
) -> Result<Option<UserAccount>, sqlx::Error> {
    let created_at = now();

    let result = sqlx::query(
        r#"INSERT INTO users (email, username, password_hash, is_active, is_admin, created_at)
           VALUES (?, ?, ?, 1, 0, ?)"#,
    )
    .bind(email)
    .bind(username)
    .bind(password_hash)
    .bind(to_millis(&created_at))
    .execute(pool)
    .await;

    match result {
        Ok(done) => Ok(Some(UserAccount {
            id: done.last_insert_rowid(),
            email: email.to_string(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            is_active: true,
            is_admin: false,
            created_at,
        })),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(None),
        Err(e) => Err(e),
    }
}

pub async fn find_by_username(pool: &Pool<Sqlite>, username: &str) -> Result<Option<UserAccount>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT id, email, username, password_hash, is_active, is_admin, created_at
           FROM users WHERE username = ?"#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(row_to_user).transpose()
}

pub async fn find_by_email(pool: &Pool<Sqlite>, email: &str) -> Result<Option<UserAccount>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT id, email, username, password_hash, is_active, is_admin, created_at
           FROM users WHERE email = ?"#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(row_to_user).transpose()
}

fn row_to_user(row: &SqliteRow) -> Result<UserAccount, sqlx::Error> {
    Ok(UserAccount {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        is_active: row.try_get("is_active")?,
        is_admin: row.try_get("is_admin")?,
        created_at: from_millis(row.try_get("created_at")?),
    })
}
