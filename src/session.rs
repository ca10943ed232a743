use chrono::NaiveDate;

use crate::models::DateRange;

/// The two dashboard screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Stock,
    Question,
}

/// Per-user navigation and selection context, passed explicitly to the
/// page handlers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub page: Page,
    pub stock_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Company and window snapshotted when leaving the stock page
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub stock_name: String,
    pub range: DateRange,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stock -> Question, snapshotting the selection. Whatever the stock page
    /// holds is copied as-is; the question page checks completeness.
    pub fn go_to_question(
        &mut self,
        stock_name: Option<String>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) {
        self.stock_name = stock_name;
        self.start_date = start_date;
        self.end_date = end_date;
        self.page = Page::Question;
    }

    /// Question -> Stock. The snapshot is kept.
    pub fn back(&mut self) {
        self.page = Page::Stock;
    }

    /// The snapshot, if company and both dates are present and ordered
    pub fn selection(&self) -> Option<Selection> {
        let stock_name = self.stock_name.as_ref().filter(|name| !name.is_empty())?;
        let range = DateRange::new(self.start_date?, self.end_date?).ok()?;
        Some(Selection {
            stock_name: stock_name.clone(),
            range,
        })
    }
}
