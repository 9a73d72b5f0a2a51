use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};
use std::time::Instant;

use crate::fasting::FastingStatus;
use crate::models::TaskType;
use crate::pomodoro::Phase;
use super::app::{AddStep, App, InputMode};

pub fn ui(f: &mut Frame, app: &mut App) {
    if app.expanded {
        expanded_view(f, app);
    } else {
        compact_view(f, app);
    }

    if app.input_mode == InputMode::Adding {
        let area = centered_rect(60, 3, f.area());
        f.render_widget(Clear, area);
        let title = match app.add_state.step {
            AddStep::Kind => "Add Task: (o)ne-time or (d)aily",
            AddStep::Name => "Add Task: Enter Name",
            AddStep::Date => "Add Task: Enter Date (YYYY-MM-DD, empty = today)",
            AddStep::Time => "Add Task: Enter Time (HH:MM)",
        };
        let input = Paragraph::new(app.input_buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(input, area);
    }
}

/// Collapsed widget: clock and the next task only.
fn compact_view(f: &mut Frame, app: &App) {
    let now = Local::now();
    let next = match app.rows.first() {
        Some(row) => format!("Next: {} ({})", row.name, row.label),
        None => "Nothing scheduled".to_string(),
    };
    let text = format!("{}\n{}", now.format("%H:%M:%S  %a %d %b"), next);
    let block = Block::default().borders(Borders::ALL).title("stickytask  [e] expand");
    f.render_widget(Paragraph::new(text).block(block), f.area());
}

fn expanded_view(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Clock + pomodoro
            Constraint::Min(0),    // Upcoming
            Constraint::Length(3), // Fasting + status
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    let now = Local::now();
    let pomodoro = match app.pomodoro.phase() {
        Phase::Idle => String::new(),
        Phase::Done => "  |  Pomodoro done".to_string(),
        phase => {
            let left = app.pomodoro.remaining(Instant::now()).unwrap_or_default().as_secs();
            let what = match phase {
                Phase::Focus(n) => format!("Focus {}", n),
                Phase::Break(n) => format!("Break {}", n),
                _ => String::new(),
            };
            format!("  |  {} {:02}:{:02}", what, left / 60, left % 60)
        }
    };
    let clock = Paragraph::new(format!("{}{}", now.format("%H:%M:%S  %A %d %B"), pomodoro))
        .block(Block::default().borders(Borders::ALL).title("stickytask"));
    f.render_widget(clock, chunks[0]);

    if app.rows.is_empty() {
        let empty = Paragraph::new("Nothing scheduled. Press 'a' to add a task.")
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL).title("Upcoming"));
        f.render_widget(empty, chunks[1]);
    } else {
        let rows: Vec<Row> = app
            .rows
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let style = if i == 0 {
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    Cell::from(r.id.to_string()),
                    Cell::from(r.name.clone()),
                    Cell::from(match r.kind {
                        TaskType::OneTime => "once",
                        TaskType::Daily => "daily",
                    }),
                    Cell::from(r.label.clone()),
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(4),
            Constraint::Min(16),
            Constraint::Length(6),
            Constraint::Length(18),
        ];

        let table = Table::new(rows, widths)
            .header(Row::new(vec!["ID", "Name", "Repeat", "When"])
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .bottom_margin(1))
            .block(Block::default().borders(Borders::ALL).title("Upcoming"))
            .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, chunks[1], &mut app.state);
    }

    let fasting = match app.fasting.status(now) {
        FastingStatus::Unset => "Fasting: not set".to_string(),
        FastingStatus::Fasting { until, remaining } => format!(
            "Fasting until {} ({}h {:02}m)",
            until.format("%H:%M"),
            remaining.num_hours(),
            remaining.num_minutes() % 60
        ),
        FastingStatus::Open { since } => format!("Eating window open since {}", since.format("%H:%M")),
    };
    let footer = match &app.status {
        Some(status) => format!("{}  |  {}", fasting, status),
        None => fasting,
    };
    f.render_widget(
        Paragraph::new(footer).block(Block::default().borders(Borders::ALL)),
        chunks[2],
    );

    let help_text = match app.input_mode {
        InputMode::Normal => "q: Quit | a: Add | Space: Done | d: Del | e: Collapse | p: Pomodoro | m: Meal",
        InputMode::Adding => "Enter: Next Step | Esc: Cancel",
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
