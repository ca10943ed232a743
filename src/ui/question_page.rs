use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::components::{render_input, render_status, StatusMessage, TextInput};
use super::layout::PageLayout;
use crate::dashboard::QuestionOutcome;
use crate::error::Result;
use crate::session::Session;

pub const MISSING_SELECTION_MESSAGE: &str = "Fetch stock data on the stock page first.";

const HELP: [(&str, &str); 2] = [("Enter", "ask"), ("Esc", "back")];

#[derive(Debug, Clone, PartialEq)]
pub enum QuestionAction {
    None,
    Ask(String),
    Back,
}

/// Free-text question about the snapshotted window, and the last outcome
#[derive(Default)]
pub struct QuestionPage {
    input: TextInput,
    outcome: Option<QuestionOutcome>,
    pub status: Option<StatusMessage>,
}

/// Status line for an outcome
pub fn outcome_message(outcome: &QuestionOutcome) -> StatusMessage {
    match outcome {
        QuestionOutcome::MissingSelection => StatusMessage::error(MISSING_SELECTION_MESSAGE),
        QuestionOutcome::NoData { stock_name, range } => StatusMessage::error(format!(
            "No data for {} between {} and {}",
            stock_name, range.start, range.end
        )),
        QuestionOutcome::Answered { .. } => StatusMessage::success("Answer received"),
    }
}

impl QuestionPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn question(&self) -> &str {
        self.input.value()
    }

    pub fn outcome(&self) -> Option<&QuestionOutcome> {
        self.outcome.as_ref()
    }

    pub fn handle_key(&mut self, code: KeyCode) -> QuestionAction {
        match code {
            KeyCode::Esc => QuestionAction::Back,
            KeyCode::Enter => {
                let question = self.input.value().trim();
                if question.is_empty() {
                    self.status = Some(StatusMessage::error("Type a question first"));
                    QuestionAction::None
                } else {
                    QuestionAction::Ask(question.to_string())
                }
            }
            KeyCode::Char(c) => {
                self.input.insert(c);
                QuestionAction::None
            }
            KeyCode::Backspace => {
                self.input.backspace();
                QuestionAction::None
            }
            KeyCode::Delete => {
                self.input.delete();
                QuestionAction::None
            }
            KeyCode::Left => {
                self.input.left();
                QuestionAction::None
            }
            KeyCode::Right => {
                self.input.right();
                QuestionAction::None
            }
            _ => QuestionAction::None,
        }
    }

    /// Record the result of an ask. Errors leave the previous answer on screen.
    pub fn set_answer(&mut self, result: Result<QuestionOutcome>) {
        match result {
            Ok(outcome) => {
                self.status = Some(outcome_message(&outcome));
                if matches!(outcome, QuestionOutcome::Answered { .. }) {
                    self.input.clear();
                }
                self.outcome = Some(outcome);
            }
            Err(e) => self.status = Some(StatusMessage::error(e.to_string())),
        }
    }

    pub fn render(&self, f: &mut Frame, session: &Session, content: Rect, status_bar: Rect) {
        let layout = PageLayout::new(content);
        let rows = layout.sidebar_rows(1);

        render_input(f, rows[0], "Question", &self.input, true);

        let selection_lines = match session.selection() {
            Some(selection) => vec![
                Line::from(Span::styled(
                    selection.stock_name,
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                )),
                Line::from(format!("{} ~ {}", selection.range.start, selection.range.end)),
            ],
            None => vec![Line::from(Span::styled(
                MISSING_SELECTION_MESSAGE,
                Style::default().fg(Color::Red),
            ))],
        };
        let selection = Paragraph::new(selection_lines)
            .block(Block::default().borders(Borders::ALL).title("Selection"))
            .wrap(Wrap { trim: true });
        f.render_widget(selection, rows[1]);

        let body = match &self.outcome {
            Some(QuestionOutcome::Answered { question, answer }) => {
                let mut lines = vec![
                    Line::from(vec![
                        Span::styled("Q: ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                        Span::raw(question.clone()),
                    ]),
                    Line::from(""),
                    Line::from(Span::styled(
                        "A:",
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    )),
                ];
                lines.extend(answer.lines().map(|line| Line::from(line.to_string())));
                Paragraph::new(lines)
            }
            Some(other) => {
                let message = outcome_message(other);
                Paragraph::new(message.text.clone()).style(Style::default().fg(message.color()))
            }
            None => Paragraph::new("Ask anything about the fetched window")
                .style(Style::default().fg(Color::Gray)),
        };
        let body = body
            .block(Block::default().borders(Borders::ALL).title("Answer"))
            .wrap(Wrap { trim: false });
        f.render_widget(body, layout.main);

        render_status(f, status_bar, self.status.as_ref(), &HELP);
    }
}
