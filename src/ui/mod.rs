use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::dashboard::Dashboard;

pub mod app;
pub mod components;
pub mod layout;
pub mod question_page;
pub mod stock_page;

pub use app::{DashboardApp, PendingAction};

type DashboardTerminal = Terminal<CrosstermBackend<io::Stdout>>;

/// Run the two-page dashboard until the user quits
pub async fn run_app(dashboard: Dashboard, export_path: PathBuf) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let mut app = DashboardApp::new(today, export_path);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!("Dashboard started");
    let result = event_loop(&mut terminal, &mut app, &dashboard).await;

    // Cleanup
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    disable_raw_mode()?;
    terminal.show_cursor()?;

    dashboard.store().close().await;
    info!("Dashboard stopped");
    result
}

async fn event_loop(terminal: &mut DashboardTerminal, app: &mut DashboardApp, dashboard: &Dashboard) -> Result<()> {
    loop {
        terminal.draw(|f| app.draw(f))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if let Some(action) = app.handle_key(key.code) {
                // Show the loading frame before blocking on the remote call
                app.set_loading(&action);
                terminal.draw(|f| app.draw(f))?;
                app.run_action(dashboard, action).await;
            }

            if app.should_quit {
                return Ok(());
            }
        }
    }
}
