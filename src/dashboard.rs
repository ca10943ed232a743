//! The two dashboard flows, independent of any screen:
//! fetch → store for the stock page, and query → ask for the question page.

use tracing::{info, warn};

use crate::api::{fetch_series, ListingTable, MarketDataProvider, QuestionAnswerer, Symbol, DEFAULT_EXCHANGE};
use crate::database::PriceStore;
use crate::error::{DashboardError, Result};
use crate::models::{DateRange, OhlcvRow};
use crate::session::Session;

/// Result of a successful fetch-and-store
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub company: String,
    pub symbol: Symbol,
    pub table: String,
    pub rows: Vec<OhlcvRow>,
}

/// What the question page shows after an ask
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionOutcome {
    /// No company/date snapshot in the session; nothing was queried
    MissingSelection,
    /// No stored rows in the window; the completion endpoint was not called
    NoData { stock_name: String, range: DateRange },
    Answered { question: String, answer: String },
}

pub struct Dashboard {
    store: PriceStore,
    listing: ListingTable,
    provider: Box<dyn MarketDataProvider>,
    answerer: Box<dyn QuestionAnswerer>,
}

impl Dashboard {
    pub fn new(
        store: PriceStore,
        listing: ListingTable,
        provider: Box<dyn MarketDataProvider>,
        answerer: Box<dyn QuestionAnswerer>,
    ) -> Self {
        Self {
            store,
            listing,
            provider,
            answerer,
        }
    }

    pub fn store(&self) -> &PriceStore {
        &self.store
    }

    /// Resolve `company`, fetch its series for `range` and replace its table.
    ///
    /// An empty series is rejected before the table is touched, so the
    /// previous contents survive a provider hiccup.
    pub async fn fetch_and_store(&self, company: &str, range: DateRange) -> Result<FetchOutcome> {
        let code = self.listing.resolve_ticker(company)?;
        let symbol = Symbol::new(DEFAULT_EXCHANGE, code);

        let rows = fetch_series(self.provider.as_ref(), &symbol, range.start, range.end).await?;
        if rows.is_empty() {
            return Err(DashboardError::EmptySeries {
                symbol: symbol.to_string(),
                start: range.start,
                end: range.end,
            });
        }

        let table = PriceStore::table_name(company);
        self.store.ensure_table(&table).await?;
        self.store.replace_rows(&table, &rows).await?;

        info!("Stored {} rows for {} ({}) in {}", rows.len(), company, symbol, table);
        Ok(FetchOutcome {
            company: company.to_string(),
            symbol,
            table,
            rows,
        })
    }

    /// Stored rows for `company` within `range`
    pub async fn stored_rows(&self, company: &str, range: DateRange) -> Result<Vec<OhlcvRow>> {
        let table = PriceStore::table_name(company);
        self.store.query_range(&table, range.start, range.end).await
    }

    /// Answer `question` about the window snapshotted in `session`
    pub async fn ask(&self, session: &Session, question: &str) -> Result<QuestionOutcome> {
        let Some(selection) = session.selection() else {
            return Ok(QuestionOutcome::MissingSelection);
        };

        // A table that was never created reads as an empty window
        let table = PriceStore::table_name(&selection.stock_name);
        self.store.ensure_table(&table).await?;
        let rows = self.stored_rows(&selection.stock_name, selection.range).await?;

        if rows.is_empty() {
            warn!(
                "No stored rows for {} between {} and {}",
                selection.stock_name, selection.range.start, selection.range.end
            );
            return Ok(QuestionOutcome::NoData {
                stock_name: selection.stock_name,
                range: selection.range,
            });
        }

        let answer = self.answerer.answer(question, &rows).await?;
        Ok(QuestionOutcome::Answered {
            question: question.to_string(),
            answer,
        })
    }
}
