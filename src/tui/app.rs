use std::sync::mpsc::Receiver;
use std::time::Instant;

use chrono::{Local, NaiveDateTime};
use ratatui::widgets::TableState;
use tracing::{debug, warn};

use crate::error::{IpcError, ValidationError};
use crate::ipc::HostHandle;
use crate::models::{DoneMeta, FastingState, FastingUpdate, NewTaskInput, Task, TaskType};
use crate::pomodoro::{Phase, Pomodoro};
use crate::schedule::{build_upcoming, minute_boundary_after};
use crate::window::{Notification, WindowSignal};

#[derive(PartialEq)]
pub enum InputMode {
    Normal,
    Adding,
}

/// One rendered row of the upcoming list. Owned so the view can outlive a
/// refresh of the task cache.
#[derive(Debug, Clone, PartialEq)]
pub struct UpcomingRow {
    pub id: u64,
    pub name: String,
    pub kind: TaskType,
    pub label: String,
}

/// State for the multi-step "Add Task" wizard.
#[derive(Default)]
pub struct AddState {
    pub kind: Option<TaskType>,
    pub name: String,
    pub date: Option<String>,
    pub step: AddStep,
}

#[derive(Default, Clone, Copy, PartialEq, Eq)]
pub enum AddStep {
    #[default]
    Kind,
    Name,
    Date,
    Time,
}

pub struct App {
    host: HostHandle,
    notifications: Receiver<Notification>,
    /// Last collection returned by the host.
    pub tasks: Vec<Task>,
    pub rows: Vec<UpcomingRow>,
    pub fasting: FastingState,
    pub pomodoro: Pomodoro,
    pub state: TableState,
    pub expanded: bool,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub add_state: AddState,
    /// One-line feedback shown under the list.
    pub status: Option<String>,
    next_refresh: NaiveDateTime,
    pub should_quit: bool,
}

impl App {
    /// Creates the app and loads the initial collections from the host.
    pub fn new(host: HostHandle, notifications: Receiver<Notification>) -> Result<App, IpcError> {
        let tasks = host.load_tasks()?;
        let fasting = host.load_fasting()?;
        let now = Local::now().naive_local();
        let mut app = App {
            host,
            notifications,
            tasks,
            rows: Vec::new(),
            fasting,
            pomodoro: Pomodoro::default(),
            state: TableState::default(),
            expanded: false,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            add_state: AddState::default(),
            status: None,
            next_refresh: now,
            should_quit: false,
        };
        app.rebuild(now);
        Ok(app)
    }

    /// Recomputes the upcoming rows from the cached tasks.
    pub fn rebuild(&mut self, now: NaiveDateTime) {
        self.rows = build_upcoming(&self.tasks, now)
            .into_iter()
            .map(|u| UpcomingRow {
                id: u.task.id,
                name: u.task.name.clone(),
                kind: u.task.task_type(),
                label: u.label,
            })
            .collect();
        self.next_refresh = minute_boundary_after(now);

        if self.rows.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.rows.len() {
                self.state.select(Some(self.rows.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    /// Periodic housekeeping: minute-boundary refresh, pomodoro phases, and
    /// notifications from the host.
    pub fn on_tick(&mut self, now: NaiveDateTime, instant: Instant) {
        if now >= self.next_refresh {
            debug!("minute boundary, rebuilding upcoming view");
            self.rebuild(now);
        }

        for phase in self.pomodoro.tick(instant) {
            self.status = Some(match phase {
                Phase::Focus(n) => format!("Focus round {} started", n),
                Phase::Break(n) => format!("Break after round {}", n),
                Phase::Done => "Pomodoro finished".to_string(),
                Phase::Idle => continue,
            });
            if phase == Phase::Done {
                self.host.signal(WindowSignal::UnlockExpanded);
            }
        }

        while let Ok(note) = self.notifications.try_recv() {
            match note {
                Notification::Collapsed => self.expanded = false,
            }
        }
    }

    /// Milliseconds until the view next needs attention.
    pub fn poll_timeout(&self, now: NaiveDateTime) -> std::time::Duration {
        let until_refresh = (self.next_refresh - now)
            .to_std()
            .unwrap_or(std::time::Duration::ZERO);
        // the clock and pomodoro countdown show seconds
        until_refresh.min(std::time::Duration::from_secs(1))
    }

    pub fn next(&mut self) {
        if self.rows.is_empty() { return; }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.rows.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.rows.is_empty() { return; }
        let i = match self.state.selected() {
            Some(0) | None => self.rows.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn selected_id(&self) -> Option<u64> {
        self.state.selected().and_then(|i| self.rows.get(i)).map(|r| r.id)
    }

    /// Marks the selected task done (for today, if it is a daily task).
    pub fn complete_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        let now = Local::now().naive_local();
        let result = self.host.mark_done(id, DoneMeta::on(now.date()));
        self.apply_tasks(result, now);
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        let now = Local::now().naive_local();
        let result = self.host.mark_deleted(id);
        self.apply_tasks(result, now);
    }

    fn apply_tasks(&mut self, result: Result<Vec<Task>, IpcError>, now: NaiveDateTime) {
        match result {
            Ok(tasks) => {
                self.tasks = tasks;
                self.rebuild(now);
            }
            Err(e) => {
                warn!(error = %e, "task request failed");
                self.status = Some(e.to_string());
            }
        }
    }

    pub fn toggle_expanded(&mut self) {
        self.expanded = !self.expanded;
        self.host.signal(if self.expanded { WindowSignal::Expand } else { WindowSignal::Collapse });
    }

    /// The terminal lost focus; the host decides whether to collapse.
    pub fn focus_lost(&self) {
        self.host.blur();
    }

    /// Starts a pomodoro, or stops the running one. The window stays expanded
    /// while a cycle runs.
    pub fn toggle_pomodoro(&mut self) {
        if self.pomodoro.phase().is_running() {
            self.pomodoro.reset();
            self.host.signal(WindowSignal::UnlockExpanded);
            self.status = Some("Pomodoro stopped".to_string());
        } else {
            self.pomodoro.start(Instant::now());
            if !self.expanded {
                self.toggle_expanded();
            }
            self.host.signal(WindowSignal::LockExpanded);
            self.status = Some("Focus round 1 started".to_string());
        }
    }

    pub fn log_meal(&mut self) {
        let update = FastingUpdate {
            gap_hours: None,
            last_meal_time: Some(Local::now()),
        };
        match self.host.save_fasting(update) {
            Ok(state) => {
                self.fasting = state;
                self.status = Some("Meal logged".to_string());
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    pub fn quit(&mut self) {
        self.host.signal(WindowSignal::Close);
        self.should_quit = true;
    }

    /// Initiates the "Add Task" wizard.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    /// Handles Enter in the "Add Task" wizard.
    pub fn handle_input(&mut self) {
        let value = self.input_buffer.trim().to_string();
        match self.add_state.step {
            AddStep::Kind => {
                let kind = match value.to_lowercase().as_str() {
                    "" | "o" | "once" | "one-time" => TaskType::OneTime,
                    "d" | "daily" => TaskType::Daily,
                    _ => return,
                };
                self.add_state.kind = Some(kind);
                self.add_state.step = AddStep::Name;
            }
            AddStep::Name => {
                if value.is_empty() { return; }
                self.add_state.name = value;
                self.add_state.step = match self.add_state.kind {
                    Some(TaskType::Daily) => AddStep::Time,
                    _ => AddStep::Date,
                };
            }
            AddStep::Date => {
                // Empty means today.
                self.add_state.date = Some(if value.is_empty() {
                    Local::now().date_naive().to_string()
                } else {
                    value
                });
                self.add_state.step = AddStep::Time;
            }
            AddStep::Time => {
                let input = NewTaskInput {
                    kind: self.add_state.kind.unwrap_or(TaskType::OneTime),
                    name: self.add_state.name.clone(),
                    date: self.add_state.date.clone(),
                    time: Some(value),
                };
                let now = Local::now().naive_local();
                match self.host.add_task(input) {
                    Ok(tasks) => {
                        self.tasks = tasks;
                        self.rebuild(now);
                        self.status = Some(format!("Added '{}'", self.add_state.name));
                        self.input_mode = InputMode::Normal;
                    }
                    Err(IpcError::Validation(e)) => {
                        // Back to the offending field.
                        let field = match &e {
                            ValidationError::MissingField(f) => *f,
                            ValidationError::Malformed { field, .. } => *field,
                        };
                        self.add_state.step = match field {
                            "name" => AddStep::Name,
                            "date" => AddStep::Date,
                            _ => AddStep::Time,
                        };
                        self.status = Some(format!("Cannot add task: {}", e));
                    }
                    Err(e) => {
                        self.status = Some(e.to_string());
                        self.input_mode = InputMode::Normal;
                    }
                }
            }
        }
        self.input_buffer.clear();
    }
}
