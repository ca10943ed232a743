use chrono::NaiveDate;
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, Wrap},
    Frame,
};

use super::components::{
    chart_bounds, period_change_percent, price_series, render_input, render_status, styled_percentage_change,
    StatusMessage, TextInput,
};
use super::layout::PageLayout;
use crate::dashboard::FetchOutcome;
use crate::error::Result;
use crate::models::DateRange;
use crate::utils::{format_large_number, format_price};

pub const DEFAULT_COMPANY: &str = "삼성전자";
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Rows shown in the preview table
pub const PREVIEW_ROWS: usize = 7;

const HELP: [(&str, &str); 5] = [
    ("Tab", "next field"),
    ("Enter", "fetch"),
    ("F5", "export"),
    ("F2", "ask AI"),
    ("Esc", "quit"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockField {
    #[default]
    Company,
    Start,
    End,
}

impl StockField {
    fn next(self) -> Self {
        match self {
            StockField::Company => StockField::Start,
            StockField::Start => StockField::End,
            StockField::End => StockField::Company,
        }
    }

    fn previous(self) -> Self {
        match self {
            StockField::Company => StockField::End,
            StockField::Start => StockField::Company,
            StockField::End => StockField::Start,
        }
    }
}

/// What the app should do after a key press on the stock page
#[derive(Debug, Clone, PartialEq)]
pub enum StockAction {
    None,
    Fetch { company: String, range: DateRange },
    Export,
    GoToQuestion,
    Quit,
}

/// Company/date inputs plus the last fetched series
pub struct StockPage {
    company: TextInput,
    start: TextInput,
    end: TextInput,
    focus: StockField,
    fetched: Option<FetchOutcome>,
    pub status: Option<StatusMessage>,
}

fn parse_date(input: &TextInput) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.value().trim(), DATE_FORMAT).ok()
}

impl StockPage {
    /// Defaults: the flagship company, January 1st through `today`
    pub fn new(today: NaiveDate) -> Self {
        let range = DateRange::year_to_date(today);
        Self {
            company: TextInput::new(DEFAULT_COMPANY),
            start: TextInput::new(range.start.format(DATE_FORMAT).to_string()),
            end: TextInput::new(range.end.format(DATE_FORMAT).to_string()),
            focus: StockField::Company,
            fetched: None,
            status: None,
        }
    }

    pub fn focus(&self) -> StockField {
        self.focus
    }

    pub fn company(&self) -> Option<String> {
        let name = self.company.value().trim();
        (!name.is_empty()).then(|| name.to_string())
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        parse_date(&self.start)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        parse_date(&self.end)
    }

    pub fn fetched(&self) -> Option<&FetchOutcome> {
        self.fetched.as_ref()
    }

    fn focused_input(&mut self) -> &mut TextInput {
        match self.focus {
            StockField::Company => &mut self.company,
            StockField::Start => &mut self.start,
            StockField::End => &mut self.end,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> StockAction {
        match code {
            KeyCode::Esc => StockAction::Quit,
            KeyCode::Tab | KeyCode::Down => {
                self.focus = self.focus.next();
                StockAction::None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.previous();
                StockAction::None
            }
            KeyCode::Enter => self.fetch_request(),
            KeyCode::F(5) => {
                if self.fetched.is_some() {
                    StockAction::Export
                } else {
                    self.status = Some(StatusMessage::error("Fetch data before exporting"));
                    StockAction::None
                }
            }
            KeyCode::F(2) => StockAction::GoToQuestion,
            KeyCode::Char(c) => {
                self.focused_input().insert(c);
                StockAction::None
            }
            KeyCode::Backspace => {
                self.focused_input().backspace();
                StockAction::None
            }
            KeyCode::Delete => {
                self.focused_input().delete();
                StockAction::None
            }
            KeyCode::Left => {
                self.focused_input().left();
                StockAction::None
            }
            KeyCode::Right => {
                self.focused_input().right();
                StockAction::None
            }
            _ => StockAction::None,
        }
    }

    fn fetch_request(&mut self) -> StockAction {
        let Some(company) = self.company() else {
            self.status = Some(StatusMessage::error("Enter a company name"));
            return StockAction::None;
        };
        let (Some(start), Some(end)) = (self.start_date(), self.end_date()) else {
            self.status = Some(StatusMessage::error("Dates must be YYYY-MM-DD"));
            return StockAction::None;
        };

        match DateRange::new(start, end) {
            Ok(range) => StockAction::Fetch { company, range },
            Err(e) => {
                self.status = Some(StatusMessage::error(e.to_string()));
                StockAction::None
            }
        }
    }

    /// Record the result of a fetch. A failure keeps the previous series.
    pub fn set_fetch_result(&mut self, result: Result<FetchOutcome>) {
        match result {
            Ok(outcome) => {
                self.status = Some(StatusMessage::success(format!(
                    "Loaded {} rows for {} ({})",
                    outcome.rows.len(),
                    outcome.company,
                    outcome.symbol
                )));
                self.fetched = Some(outcome);
            }
            Err(e) => self.status = Some(StatusMessage::error(e.to_string())),
        }
    }

    pub fn render(&self, f: &mut Frame, content: Rect, status_bar: Rect) {
        let layout = PageLayout::new(content);
        let rows = layout.sidebar_rows(3);

        render_input(f, rows[0], "Company", &self.company, self.focus == StockField::Company);
        render_input(f, rows[1], "Start (YYYY-MM-DD)", &self.start, self.focus == StockField::Start);
        render_input(f, rows[2], "End (YYYY-MM-DD)", &self.end, self.focus == StockField::End);

        let hint = Paragraph::new(vec![
            Line::from("Enter a listed company name"),
            Line::from("and a date window, then press"),
            Line::from(Span::styled("Enter", Style::default().fg(Color::Yellow))),
            Line::from("to fetch and store the series."),
        ])
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .wrap(Wrap { trim: true });
        f.render_widget(hint, rows[3]);

        match &self.fetched {
            Some(outcome) => self.render_series(f, layout.main, outcome),
            None => {
                let empty = Paragraph::new("No data fetched yet")
                    .block(Block::default().borders(Borders::ALL).title("Stock Data"))
                    .style(Style::default().fg(Color::Gray));
                f.render_widget(empty, layout.main);
            }
        }

        render_status(f, status_bar, self.status.as_ref(), &HELP);
    }

    fn render_series(&self, f: &mut Frame, area: Rect, outcome: &FetchOutcome) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),                       // Summary
                Constraint::Length(PREVIEW_ROWS as u16 + 3), // Table
                Constraint::Min(0),                          // Chart
            ])
            .split(area);

        let mut summary = vec![
            Span::styled(
                format!("{} ", outcome.company),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("{} ", outcome.symbol), Style::default().fg(Color::Gray)),
            Span::raw(format!("{} rows ", outcome.rows.len())),
        ];
        if let Some(change) = period_change_percent(&outcome.rows) {
            summary.push(styled_percentage_change(change));
        }
        let summary = Paragraph::new(Line::from(summary))
            .block(Block::default().borders(Borders::ALL).title(outcome.table.clone()));
        f.render_widget(summary, chunks[0]);

        self.render_preview(f, chunks[1], outcome);
        self.render_chart(f, chunks[2], outcome);
    }

    fn render_preview(&self, f: &mut Frame, area: Rect, outcome: &FetchOutcome) {
        let tail = &outcome.rows[outcome.rows.len().saturating_sub(PREVIEW_ROWS)..];

        let header = Row::new(["Date", "Open", "High", "Low", "Close", "Volume"])
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        let body = tail.iter().map(|row| {
            Row::new(vec![
                Cell::from(row.date.format(DATE_FORMAT).to_string()),
                Cell::from(format_price(row.open)),
                Cell::from(format_price(row.high)),
                Cell::from(format_price(row.low)),
                Cell::from(format_price(row.close)),
                Cell::from(format_large_number(row.volume as f64)),
            ])
        });

        let widths = [
            Constraint::Length(11),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(9),
        ];
        let table = Table::new(body, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Latest rows"));
        f.render_widget(table, area);
    }

    fn render_chart(&self, f: &mut Frame, area: Rect, outcome: &FetchOutcome) {
        let series = price_series(&outcome.rows);
        let datasets: Vec<Dataset> = series
            .iter()
            .map(|(name, color, points)| {
                Dataset::default()
                    .name(*name)
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(*color))
                    .data(points)
            })
            .collect();

        let (x_bounds, y_bounds) = chart_bounds(&outcome.rows);
        let first = outcome.rows.first().map(|r| r.date.format(DATE_FORMAT).to_string());
        let last = outcome.rows.last().map(|r| r.date.format(DATE_FORMAT).to_string());

        let chart = Chart::new(datasets)
            .block(Block::default().borders(Borders::ALL).title("Price"))
            .x_axis(
                Axis::default()
                    .style(Style::default().fg(Color::Gray))
                    .bounds(x_bounds)
                    .labels(vec![first.unwrap_or_default(), last.unwrap_or_default()]),
            )
            .y_axis(
                Axis::default()
                    .style(Style::default().fg(Color::Gray))
                    .bounds(y_bounds)
                    .labels(vec![format_price(y_bounds[0]), format_price(y_bounds[1])]),
            );
        f.render_widget(chart, area);
    }
}
