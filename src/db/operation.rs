use sqlx::{sqlite::SqliteRow, Pool, Row, Sqlite};
use crate::db::{from_millis, now, to_millis};
use crate::models::{OperationType, StakeOperation};

/// A stake operation that has not been stored yet
#[derive(Debug, Clone)]
pub struct NewStakeOperation {
    pub netuid: u16,
    pub hotkey: String,
    pub operation_type: OperationType,
    pub amount: f64,
    pub sentiment_score: i32,
    pub transaction_hash: Option<String>,
    pub successful: bool,
    pub error_message: Option<String>,
}

pub async fn insert_operation(
    pool: &Pool<Sqlite>,
    op: NewStakeOperation,
) -> Result<StakeOperation, sqlx::Error> {
    let timestamp = now();

    let id = sqlx::query(
        r#"INSERT INTO stake_operations
           (netuid, hotkey, operation_type, amount, sentiment_score, transaction_hash, successful, error_message, timestamp)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(i64::from(op.netuid))
    .bind(&op.hotkey)
    .bind(op.operation_type.as_str())
    .bind(op.amount)
    .bind(op.sentiment_score)
    .bind(op.transaction_hash.as_deref())
    .bind(op.successful)
    .bind(op.error_message.as_deref())
    .bind(to_millis(&timestamp))
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(StakeOperation {
        id,
        netuid: op.netuid,
        hotkey: op.hotkey,
        operation_type: op.operation_type,
        amount: op.amount,
        sentiment_score: op.sentiment_score,
        transaction_hash: op.transaction_hash,
        successful: op.successful,
        error_message: op.error_message,
        timestamp,
    })
}

/// Operation history, newest first. Either filter may be omitted.
pub async fn get_operations(
    pool: &Pool<Sqlite>,
    netuid: Option<u16>,
    hotkey: Option<&str>,
) -> Result<Vec<StakeOperation>, sqlx::Error> {
    let netuid = netuid.map(i64::from);

    let rows = sqlx::query(
        r#"SELECT id, netuid, hotkey, operation_type, amount, sentiment_score,
                  transaction_hash, successful, error_message, timestamp
           FROM stake_operations
           WHERE (? IS NULL OR netuid = ?)
           AND (? IS NULL OR hotkey = ?)
           ORDER BY timestamp DESC, id DESC"#,
    )
    .bind(netuid)
    .bind(netuid)
    .bind(hotkey)
    .bind(hotkey)
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_operation).collect()
}

fn row_to_operation(row: &SqliteRow) -> Result<StakeOperation, sqlx::Error> {
    let op_type: String = row.try_get("operation_type")?;
    let operation_type = OperationType::parse(&op_type).ok_or_else(|| sqlx::Error::ColumnDecode {
        index: "operation_type".to_string(),
        source: format!("unknown operation type: {}", op_type).into(),
    })?;
    let netuid: i64 = row.try_get("netuid")?;

    Ok(StakeOperation {
        id: row.try_get("id")?,
        netuid: u16::try_from(netuid).map_err(|e| sqlx::Error::ColumnDecode {
            index: "netuid".to_string(),
            source: Box::new(e),
        })?,
        hotkey: row.try_get("hotkey")?,
        operation_type,
        amount: row.try_get("amount")?,
        sentiment_score: row.try_get("sentiment_score")?,
        transaction_hash: row.try_get("transaction_hash")?,
        successful: row.try_get("successful")?,
        error_message: row.try_get("error_message")?,
        timestamp: from_millis(row.try_get("timestamp")?),
    })
}
