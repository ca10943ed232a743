use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use std::fmt;
use tracing::debug;

use crate::error::{DashboardError, Result};
use crate::models::{DateRange, OhlcvRow};

pub mod krx_listing;
pub mod naver_client;
pub mod openai_client;

pub use krx_listing::{KrxListingClient, ListingTable};
pub use naver_client::NaverChartClient;
pub use openai_client::OpenAiClient;

/// Default exchange prefix for listing codes
pub const DEFAULT_EXCHANGE: &str = "KRX";

/// Exchange-prefixed ticker, e.g. `KRX:005930`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub exchange: String,
    pub code: String,
}

impl Symbol {
    pub fn new(exchange: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
            code: code.into(),
        }
    }

    /// Parse `EXCHANGE:CODE`; a bare code is taken as KRX
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let (exchange, code) = match raw.split_once(':') {
            Some((exchange, code)) => (exchange.trim(), code.trim()),
            None => (DEFAULT_EXCHANGE, raw),
        };

        if exchange.is_empty() || code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DashboardError::InvalidSymbol(raw.to_string()));
        }

        Ok(Self::new(exchange.to_ascii_uppercase(), code.to_ascii_uppercase()))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.exchange, self.code)
    }
}

/// Daily OHLCV source. `end_exclusive` is not part of the requested window.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn daily_bars(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end_exclusive: NaiveDate,
    ) -> Result<Vec<OhlcvRow>>;
}

/// Source of the company name to ticker listing
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_listing(&self) -> Result<ListingTable>;
}

/// Answers a free-text question about a window of rows
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionAnswerer: Send + Sync {
    async fn answer(&self, question: &str, rows: &[OhlcvRow]) -> Result<String>;
}

/// Fetch the inclusive window `[start, end]` for `symbol`.
///
/// The provider works with an exclusive end, so the request is widened by one
/// day; the result is clipped back to the window, sorted and de-duplicated by
/// date.
pub async fn fetch_series(
    provider: &dyn MarketDataProvider,
    symbol: &Symbol,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<OhlcvRow>> {
    let range = DateRange::new(start, end)?;
    let end_exclusive = end + Duration::days(1);

    let mut rows = provider.daily_bars(symbol, start, end_exclusive).await?;
    let received = rows.len();

    rows.retain(|row| range.contains(row.date));
    rows.sort_by_key(|row| row.date);
    rows.dedup_by_key(|row| row.date);

    debug!(
        "Fetched {} rows for {} ({} kept) between {} and {}",
        received,
        symbol,
        rows.len(),
        start,
        end
    );
    Ok(rows)
}
