use sqlx::{sqlite::SqliteRow, Pool, Row, Sqlite};
use crate::db::{from_millis, to_millis};
use crate::models::DividendQuote;

/// Append a fetched quote. Quotes without a value are not stored.
pub async fn insert_quote(pool: &Pool<Sqlite>, quote: &DividendQuote) -> Result<(), sqlx::Error> {
    let Some(dividend) = quote.dividend else {
        return Ok(());
    };

    sqlx::query(
        "INSERT INTO tao_dividends (netuid, hotkey, dividend, timestamp) VALUES (?, ?, ?, ?)",
    )
    .bind(quote.netuid.map(i64::from))
    .bind(quote.hotkey.as_deref())
    .bind(dividend.to_string())
    .bind(to_millis(&quote.timestamp))
    .execute(pool)
    .await?;

    Ok(())
}

/// Stored quotes for a key, newest first
pub async fn get_quotes(
    pool: &Pool<Sqlite>,
    netuid: Option<u16>,
    hotkey: Option<&str>,
) -> Result<Vec<DividendQuote>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT netuid, hotkey, dividend, timestamp
           FROM tao_dividends
           WHERE netuid IS ? AND hotkey IS ?
           ORDER BY timestamp DESC, id DESC"#,
    )
    .bind(netuid.map(i64::from))
    .bind(hotkey)
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_quote).collect()
}

fn row_to_quote(row: &SqliteRow) -> Result<DividendQuote, sqlx::Error> {
    let dividend: String = row.try_get("dividend")?;
    let dividend = dividend.parse::<u64>().map_err(|e| sqlx::Error::ColumnDecode {
        index: "dividend".to_string(),
        source: Box::new(e),
    })?;

    Ok(DividendQuote {
        netuid: row
            .try_get::<Option<i64>, _>("netuid")?
            .and_then(|n| u16::try_from(n).ok()),
        hotkey: row.try_get("hotkey")?,
        dividend: Some(dividend),
        timestamp: from_millis(row.try_get("timestamp")?),
        cached: false,
    })
}
