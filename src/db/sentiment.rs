use sqlx::{Pool, Row, Sqlite};
use crate::db::{from_millis, now, to_millis};
use crate::models::SentimentRecord;

pub async fn insert_record(
    pool: &Pool<Sqlite>,
    netuid: u16,
    sentiment_score: i32,
    tweet_count: usize,
    search_term: &str,
) -> Result<SentimentRecord, sqlx::Error> {
    let timestamp = now();

    let id = sqlx::query(
        r#"INSERT INTO sentiment_analysis (netuid, sentiment_score, tweet_count, search_term, timestamp)
           VALUES (?, ?, ?, ?, ?)"#,
    )
    .bind(i64::from(netuid))
    .bind(sentiment_score)
    .bind(tweet_count as i64)
    .bind(search_term)
    .bind(to_millis(&timestamp))
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(SentimentRecord {
        id,
        netuid,
        sentiment_score,
        tweet_count: tweet_count as i64,
        search_term: search_term.to_string(),
        timestamp,
    })
}

/// Sentiment history for a subnet, newest first
pub async fn get_records(pool: &Pool<Sqlite>, netuid: u16) -> Result<Vec<SentimentRecord>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT id, netuid, sentiment_score, tweet_count, search_term, timestamp
           FROM sentiment_analysis
           WHERE netuid = ?
           ORDER BY timestamp DESC, id DESC"#,
    )
    .bind(i64::from(netuid))
    .fetch_all(pool)
    .await?;

    let records = rows
        .iter()
        .map(|row| SentimentRecord {
            id: row.get("id"),
            netuid,
            sentiment_score: row.get("sentiment_score"),
            tweet_count: row.get("tweet_count"),
            search_term: row.get("search_term"),
            timestamp: from_millis(row.get("timestamp")),
        })
        .collect();

    Ok(records)
}
