use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Tabs},
    Frame,
};

use crate::session::Page;

/// Screen split shared by both pages
pub struct TuiLayout {
    pub tab_bar: Rect,
    pub content: Rect,
    pub status_bar: Rect,
}

impl TuiLayout {
    /// Create a new layout from the given area
    pub fn new(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Tab bar
                Constraint::Min(0),    // Content
                Constraint::Length(4), // Status bar
            ])
            .split(area);

        Self {
            tab_bar: chunks[0],
            content: chunks[1],
            status_bar: chunks[2],
        }
    }

    /// Render the tab bar with the active page highlighted
    pub fn render_tab_bar(&self, f: &mut Frame, page: Page) {
        let selected = match page {
            Page::Stock => 0,
            Page::Question => 1,
        };

        let tabs = Tabs::new(vec!["Stock Data", "Ask AI"])
            .block(Block::default().borders(Borders::ALL).title("Stock Dashboard"))
            .style(Style::default().fg(Color::White))
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .select(selected);

        f.render_widget(tabs, self.tab_bar);
    }
}

/// Sidebar of inputs on the left, results on the right
pub struct PageLayout {
    pub sidebar: Rect,
    pub main: Rect,
}

impl PageLayout {
    pub fn new(content: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(0)])
            .split(content);

        Self {
            sidebar: chunks[0],
            main: chunks[1],
        }
    }

    /// Split the sidebar into `inputs` boxes of height 3 plus a remainder
    pub fn sidebar_rows(&self, inputs: usize) -> Vec<Rect> {
        let mut constraints = vec![Constraint::Length(3); inputs];
        constraints.push(Constraint::Min(0));

        Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(self.sidebar)
            .to_vec()
    }
}
