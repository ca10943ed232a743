//! In-memory stand-ins for the remote services

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use stock_dashboard::api::{MarketDataProvider, QuestionAnswerer, Symbol};
use stock_dashboard::models::OhlcvRow;
use stock_dashboard::Result;

/// Serves a fixed series, honouring the exclusive end bound
#[derive(Clone, Default)]
pub struct FakeProvider {
    rows: Vec<OhlcvRow>,
    pub calls: Arc<Mutex<Vec<(Symbol, NaiveDate, NaiveDate)>>>,
}

impl FakeProvider {
    pub fn new(rows: Vec<OhlcvRow>) -> Self {
        Self {
            rows,
            calls: Arc::default(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl MarketDataProvider for FakeProvider {
    async fn daily_bars(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end_exclusive: NaiveDate,
    ) -> Result<Vec<OhlcvRow>> {
        self.calls
            .lock()
            .unwrap()
            .push((symbol.clone(), start, end_exclusive));

        Ok(self
            .rows
            .iter()
            .filter(|row| row.date >= start && row.date < end_exclusive)
            .cloned()
            .collect())
    }
}

/// Answers with the number of rows it was given and counts calls
#[derive(Clone, Default)]
pub struct CountingAnswerer {
    pub calls: Arc<AtomicUsize>,
}

impl CountingAnswerer {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuestionAnswerer for CountingAnswerer {
    async fn answer(&self, question: &str, rows: &[OhlcvRow]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{}: {} rows", question, rows.len()))
    }
}
