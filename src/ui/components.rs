/// UI components and utilities shared by the two dashboard pages
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::models::OhlcvRow;

/// Single-line text input with a char-indexed cursor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
        }
    }

    /// Terminal columns before the cursor; Hangul, emoji and other wide chars take two
    pub fn display_offset(&self) -> u16 {
        self.value
            .chars()
            .take(self.cursor)
            .map(|c| c.width().unwrap_or(0) as u16)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Success,
    Error,
}

/// One line of feedback shown at the bottom of a page
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self { level: StatusLevel::Success, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { level: StatusLevel::Error, text: text.into() }
    }

    pub fn color(&self) -> Color {
        match self.level {
            StatusLevel::Success => Color::Green,
            StatusLevel::Error => Color::Red,
        }
    }
}

/// Render a labelled input box, highlighted when focused
pub fn render_input(f: &mut Frame, area: Rect, title: &str, input: &TextInput, focused: bool) {
    let border_style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    let paragraph = Paragraph::new(input.value())
        .block(Block::default().borders(Borders::ALL).title(title.to_string()).border_style(border_style))
        .style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);

    if focused {
        let x = area.x + 1 + input.display_offset();
        f.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

/// Render a loading indicator
pub fn render_loading_indicator(f: &mut Frame, area: Rect, message: &str) {
    let loading = Paragraph::new(message)
        .block(Block::default().borders(Borders::ALL).title("Loading"))
        .style(Style::default().fg(Color::Yellow));

    f.render_widget(loading, area);
}

/// Render the status line of a page
pub fn render_status(f: &mut Frame, area: Rect, status: Option<&StatusMessage>, help: &[(&str, &str)]) {
    let mut help_spans = Vec::new();
    for (i, (key, action)) in help.iter().enumerate() {
        if i > 0 {
            help_spans.push(Span::styled(" • ", Style::default().fg(Color::Gray)));
        }
        help_spans.push(Span::styled(key.to_string(), Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
        help_spans.push(Span::styled(format!(" {}", action), Style::default().fg(Color::Gray)));
    }

    let mut lines = vec![Line::from(help_spans)];
    if let Some(status) = status {
        lines.push(Line::from(Span::styled(status.text.clone(), Style::default().fg(status.color()))));
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

/// Create a percentage change span with + or - prefix
pub fn styled_percentage_change(value: f64) -> Span<'static> {
    let formatted = if value >= 0.0 {
        format!("+{:.1}%", value)
    } else {
        format!("{:.1}%", value)
    };

    if value >= 0.0 {
        Span::styled(formatted, Style::default().fg(Color::Green))
    } else {
        Span::styled(formatted, Style::default().fg(Color::Red))
    }
}

/// Percentage change of the close from the first to the last row
pub fn period_change_percent(rows: &[OhlcvRow]) -> Option<f64> {
    let first = rows.first()?.close;
    let last = rows.last()?.close;
    if first == 0.0 {
        return None;
    }
    Some((last - first) / first * 100.0)
}

/// One chart line per price field: (name, color, points indexed by row)
pub fn price_series(rows: &[OhlcvRow]) -> Vec<(&'static str, Color, Vec<(f64, f64)>)> {
    let series = |pick: fn(&OhlcvRow) -> f64| -> Vec<(f64, f64)> {
        rows.iter().enumerate().map(|(i, row)| (i as f64, pick(row))).collect()
    };

    vec![
        ("Close", Color::Cyan, series(|r| r.close)),
        ("Open", Color::Green, series(|r| r.open)),
        ("High", Color::Red, series(|r| r.high)),
        ("Low", Color::Magenta, series(|r| r.low)),
    ]
}

/// X and Y bounds for `price_series`, with a small vertical margin
pub fn chart_bounds(rows: &[OhlcvRow]) -> ([f64; 2], [f64; 2]) {
    if rows.is_empty() {
        return ([0.0, 1.0], [0.0, 1.0]);
    }

    let min = rows.iter().map(|r| r.low.min(r.open).min(r.close)).fold(f64::INFINITY, f64::min);
    let max = rows.iter().map(|r| r.high.max(r.open).max(r.close)).fold(f64::NEG_INFINITY, f64::max);
    let margin = if (max - min).abs() < f64::EPSILON { 1.0 } else { (max - min) * 0.05 };

    let x_max = (rows.len().saturating_sub(1)).max(1) as f64;
    ([0.0, x_max], [min - margin, max + margin])
}
