use chrono::NaiveDate;
use crossterm::event::KeyCode;
use ratatui::Frame;
use std::path::PathBuf;
use tracing::{error, info};

use super::components::{render_loading_indicator, StatusMessage};
use super::layout::TuiLayout;
use super::question_page::{QuestionAction, QuestionPage};
use super::stock_page::{StockAction, StockPage};
use crate::dashboard::Dashboard;
use crate::export::export_to_file;
use crate::models::DateRange;
use crate::session::{Page, Session};

/// Work that needs the network or the store; run by the event loop after a
/// loading frame has been drawn
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    Fetch { company: String, range: DateRange },
    Ask(String),
}

impl PendingAction {
    pub fn loading_message(&self) -> String {
        match self {
            PendingAction::Fetch { company, range } => {
                format!("Fetching {} from {} to {}...", company, range.start, range.end)
            }
            PendingAction::Ask(_) => "Waiting for the answer...".to_string(),
        }
    }
}

/// Routes keys and drawing to the page the session is on
pub struct DashboardApp {
    pub session: Session,
    pub stock_page: StockPage,
    pub question_page: QuestionPage,
    pub should_quit: bool,
    export_path: PathBuf,
    loading: Option<String>,
}

impl DashboardApp {
    pub fn new(today: NaiveDate, export_path: impl Into<PathBuf>) -> Self {
        Self {
            session: Session::new(),
            stock_page: StockPage::new(today),
            question_page: QuestionPage::new(),
            should_quit: false,
            export_path: export_path.into(),
            loading: None,
        }
    }

    pub fn draw(&self, f: &mut Frame) {
        let layout = TuiLayout::new(f.area());
        layout.render_tab_bar(f, self.session.page);

        match self.session.page {
            Page::Stock => self.stock_page.render(f, layout.content, layout.status_bar),
            Page::Question => self
                .question_page
                .render(f, &self.session, layout.content, layout.status_bar),
        }

        if let Some(message) = &self.loading {
            render_loading_indicator(f, layout.status_bar, message);
        }
    }

    /// Handle a key press; returns the action to await, if any
    pub fn handle_key(&mut self, code: KeyCode) -> Option<PendingAction> {
        match self.session.page {
            Page::Stock => match self.stock_page.handle_key(code) {
                StockAction::None => None,
                StockAction::Fetch { company, range } => Some(PendingAction::Fetch { company, range }),
                StockAction::Export => {
                    self.export();
                    None
                }
                StockAction::GoToQuestion => {
                    self.session.go_to_question(
                        self.stock_page.company(),
                        self.stock_page.start_date(),
                        self.stock_page.end_date(),
                    );
                    None
                }
                StockAction::Quit => {
                    self.should_quit = true;
                    None
                }
            },
            Page::Question => match self.question_page.handle_key(code) {
                QuestionAction::None => None,
                QuestionAction::Ask(question) => Some(PendingAction::Ask(question)),
                QuestionAction::Back => {
                    self.session.back();
                    None
                }
            },
        }
    }

    fn export(&mut self) {
        let Some(outcome) = self.stock_page.fetched() else {
            return;
        };

        let status = match export_to_file(&self.export_path, &outcome.rows) {
            Ok(()) => StatusMessage::success(format!(
                "Exported {} rows to {}",
                outcome.rows.len(),
                self.export_path.display()
            )),
            Err(e) => {
                error!("Export failed: {}", e);
                StatusMessage::error(format!("Export failed: {}", e))
            }
        };
        self.stock_page.status = Some(status);
    }

    pub fn set_loading(&mut self, action: &PendingAction) {
        self.loading = Some(action.loading_message());
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    /// Await `action` against the dashboard and route the result to its page
    pub async fn run_action(&mut self, dashboard: &Dashboard, action: PendingAction) {
        match action {
            PendingAction::Fetch { company, range } => {
                info!("Fetching {} for {} ~ {}", company, range.start, range.end);
                let result = dashboard.fetch_and_store(&company, range).await;
                if let Err(e) = &result {
                    error!("Fetch failed for {}: {}", company, e);
                }
                self.stock_page.set_fetch_result(result);
            }
            PendingAction::Ask(question) => {
                let result = dashboard.ask(&self.session, &question).await;
                if let Err(e) = &result {
                    error!("Question failed: {}", e);
                }
                self.question_page.set_answer(result);
            }
        }
        self.loading = None;
    }
}
