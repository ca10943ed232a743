use chrono::NaiveDate;
use sqlx::any::{AnyPool, AnyPoolOptions, AnyRow};
use sqlx::Row;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::OhlcvRow;

/// Per-company OHLCV tables behind an `sqlx` Any pool (MySQL or SQLite)
#[derive(Clone)]
pub struct PriceStore {
    pool: AnyPool,
}

impl PriceStore {
    /// Connect to the store at `database_url`
    pub async fn connect(database_url: &str) -> Result<Self> {
        // An in-memory SQLite database only lives as long as its connection
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect(database_url)
            .await?;

        info!("Connected to price store ({:?})", pool.any_kind());
        Ok(Self { pool })
    }

    /// Table name used for a company's display name
    pub fn table_name(company: &str) -> String {
        format!("table_{}", company)
    }

    /// Create the table if it does not exist yet
    pub async fn ensure_table(&self, table: &str) -> Result<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                date DATE NOT NULL PRIMARY KEY,
                open DOUBLE NOT NULL,
                high DOUBLE NOT NULL,
                low DOUBLE NOT NULL,
                close DOUBLE NOT NULL,
                volume BIGINT NOT NULL
            )",
            quote_identifier(table)
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        debug!("Ensured table {}", table);
        Ok(())
    }

    /// Replace every row of `table` with `rows` in a single transaction
    pub async fn replace_rows(&self, table: &str, rows: &[OhlcvRow]) -> Result<usize> {
        let quoted = quote_identifier(table);
        let delete_sql = format!("DELETE FROM {}", quoted);
        let insert_sql = format!(
            "INSERT INTO {} (date, open, high, low, close, volume) VALUES (?, ?, ?, ?, ?, ?)",
            quoted
        );

        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query(&delete_sql).execute(&mut tx).await?.rows_affected();

        for row in rows {
            sqlx::query(&insert_sql)
                .bind(row.date)
                .bind(row.open)
                .bind(row.high)
                .bind(row.low)
                .bind(row.close)
                .bind(row.volume)
                .execute(&mut tx)
                .await?;
        }

        tx.commit().await?;

        info!("Replaced {} rows of {} with {} rows", deleted, table, rows.len());
        Ok(rows.len())
    }

    /// All rows of `table` dated within `[start, end]`, oldest first
    pub async fn query_range(
        &self,
        table: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OhlcvRow>> {
        let sql = format!(
            "SELECT date, open, high, low, close, volume FROM {}
             WHERE date BETWEEN ? AND ?
             ORDER BY date",
            quote_identifier(table)
        );

        let rows = sqlx::query(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        let rows = rows
            .iter()
            .map(row_to_ohlcv)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!("Queried {} rows from {} between {} and {}", rows.len(), table, start, end);
        Ok(rows)
    }

    /// Number of rows currently stored in `table`
    pub async fn count_rows(&self, table: &str) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) AS n FROM {}", quote_identifier(table));
        let row = sqlx::query(&sql).fetch_one(&self.pool).await?;
        Ok(row.try_get::<i64, _>("n")?)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn row_to_ohlcv(row: &AnyRow) -> std::result::Result<OhlcvRow, sqlx::Error> {
    Ok(OhlcvRow {
        date: row.try_get("date")?,
        open: row.try_get("open")?,
        high: row.try_get("high")?,
        low: row.try_get("low")?,
        close: row.try_get("close")?,
        volume: row.try_get("volume")?,
    })
}

/// Backtick-quote an identifier; both MySQL and SQLite accept this form.
/// Embedded backticks are doubled so the name cannot leave the quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}
