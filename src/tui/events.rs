use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::config::MatchProfile;
use crate::host::{DirectoryLister, FsDirectoryLister};
use super::app::App;
use super::models::Focus;
use super::rendering::ui;

pub async fn run_tui(profile: MatchProfile) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::with_profile(FsDirectoryLister, profile);
    let res = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

async fn run_app<B, L>(terminal: &mut Terminal<B>, app: &mut App<L>) -> Result<()>
where
    B: ratatui::backend::Backend,
    L: DirectoryLister,
{
    loop {
        app.clear_status_message_if_expired();
        app.refresh_queue_count();

        terminal.draw(|f| ui(f, app))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if app.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::F(1)) {
                app.toggle_help();
            }
            continue;
        }

        match key.code {
            KeyCode::Esc => return Ok(()),
            KeyCode::F(1) => app.toggle_help(),
            KeyCode::Tab => app.focus_next(),
            KeyCode::BackTab => app.focus_previous(),
            KeyCode::F(2) => app.add_rule(),
            KeyCode::F(3) | KeyCode::Delete => app.remove_focused_rule(),
            KeyCode::F(5) | KeyCode::Enter => app.run_match().await,
            KeyCode::F(6) => app.queue_matches(),
            KeyCode::F(8) => app.clear_queue(),
            KeyCode::Down => {
                if app.focus == Focus::Preview {
                    app.next();
                } else {
                    app.focus_next();
                }
            }
            KeyCode::Up => {
                if app.focus == Focus::Preview {
                    app.previous();
                } else {
                    app.focus_previous();
                }
            }
            KeyCode::Backspace => app.backspace(),
            KeyCode::Char(c) => app.input_char(c),
            _ => {}
        }
    }
}
