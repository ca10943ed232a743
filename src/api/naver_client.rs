use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::{MarketDataProvider, Symbol};
use crate::error::{DashboardError, Result};
use crate::models::OhlcvRow;

pub const DEFAULT_NAVER_API_BASE: &str = "https://api.finance.naver.com";

/// Exchange prefixes served by the Naver daily chart
const SUPPORTED_EXCHANGES: &[&str] = &["KRX", "KOSPI", "KOSDAQ", "KONEX"];

/// Daily OHLCV for Korean listings from the Naver `siseJson` chart endpoint
pub struct NaverChartClient {
    client: Client,
    api_base: String,
}

impl NaverChartClient {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        Self::with_api_base(DEFAULT_NAVER_API_BASE, timeout_secs)
    }

    pub fn with_api_base(api_base: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent("stock-dashboard/0.1")
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MarketDataProvider for NaverChartClient {
    async fn daily_bars(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end_exclusive: NaiveDate,
    ) -> Result<Vec<OhlcvRow>> {
        if !SUPPORTED_EXCHANGES.contains(&symbol.exchange.as_str()) {
            return Err(DashboardError::Provider(format!(
                "unsupported exchange '{}' for {}",
                symbol.exchange, symbol
            )));
        }
        if end_exclusive <= start {
            return Ok(Vec::new());
        }

        // The chart endpoint treats endTime as inclusive
        let last_day = end_exclusive - Duration::days(1);
        let url = format!("{}/siseJson.naver", self.api_base);

        debug!("Requesting daily chart for {} from {} to {}", symbol, start, last_day);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol.code.as_str()),
                ("requestType", "1"),
                ("startTime", &start.format("%Y%m%d").to_string()),
                ("endTime", &last_day.format("%Y%m%d").to_string()),
                ("timeframe", "day"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DashboardError::Provider(format!(
                "chart request for {} failed with status {}: {}",
                symbol, status, body
            )));
        }

        let body = response.text().await?;
        let rows = parse_sise_json(&body)?;

        Ok(rows
            .into_iter()
            .filter(|row| row.date >= start && row.date < end_exclusive)
            .collect())
    }
}

/// Parse the `siseJson` payload: a JS array literal whose first row is the
/// header and whose data rows read `["YYYYMMDD", open, high, low, close, volume, ...]`
pub fn parse_sise_json(body: &str) -> Result<Vec<OhlcvRow>> {
    let normalized = body.trim().replace('\'', "\"");
    let table: Vec<Vec<Value>> = serde_json::from_str(&normalized)?;

    let mut rows = Vec::with_capacity(table.len().saturating_sub(1));
    for record in table.iter().skip(1) {
        match parse_record(record) {
            Some(row) => rows.push(row),
            None => warn!("Skipping malformed chart record: {:?}", record),
        }
    }
    Ok(rows)
}

fn parse_record(record: &[Value]) -> Option<OhlcvRow> {
    if record.len() < 6 {
        return None;
    }

    let date = NaiveDate::parse_from_str(record[0].as_str()?.trim(), "%Y%m%d").ok()?;
    let volume = record[5]
        .as_i64()
        .or_else(|| record[5].as_f64().map(|v| v as i64))?;

    Some(OhlcvRow {
        date,
        open: record[1].as_f64()?,
        high: record[2].as_f64()?,
        low: record[3].as_f64()?,
        close: record[4].as_f64()?,
        volume,
    })
}
