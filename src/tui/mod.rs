pub mod app;
pub mod ui;

use std::io;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    event::{self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::error;

use crate::config::AppConfig;
use crate::ipc::{self, Host};
use app::{App, InputMode};
use ui::ui;

/// Runs the widget. The UI side talks to the stores only through the host.
pub fn run_tui(config: &AppConfig) -> Result<()> {
    let (host, notifications) = ipc::spawn(Host::open(config));
    let mut app = App::new(host, notifications).context("Failed to load initial state")?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableFocusChange)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = %err, "ui loop failed");
    }
    res.map_err(Into::into)
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        let now = Local::now().naive_local();
        app.on_tick(now, Instant::now());
        terminal.draw(|f| ui(f, app))?;

        if !event::poll(app.poll_timeout(now))? {
            continue;
        }
        match event::read()? {
            Event::FocusLost => app.focus_lost(),
            Event::Key(key) if key.kind == KeyEventKind::Press => match app.input_mode {
                InputMode::Normal => match key.code {
                    KeyCode::Char('q') => app.quit(),
                    KeyCode::Down | KeyCode::Char('j') => app.next(),
                    KeyCode::Up | KeyCode::Char('k') => app.previous(),
                    KeyCode::Char(' ') => app.complete_selected(),
                    KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
                    KeyCode::Char('a') => app.start_add(),
                    KeyCode::Char('e') => app.toggle_expanded(),
                    KeyCode::Char('p') => app.toggle_pomodoro(),
                    KeyCode::Char('m') => app.log_meal(),
                    _ => {}
                },
                InputMode::Adding => match key.code {
                    KeyCode::Enter => app.handle_input(),
                    KeyCode::Esc => app.cancel_input(),
                    KeyCode::Char(c) => app.input_buffer.push(c),
                    KeyCode::Backspace => {
                        app.input_buffer.pop();
                    }
                    _ => {}
                },
            },
            _ => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
