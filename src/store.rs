use std::path::PathBuf;
use std::time::Duration;

use chrono::{Local, NaiveTime};
use tracing::{debug, warn};

use crate::error::ValidationError;
use crate::models::{parse_date, parse_time, DoneMeta, NewTaskInput, Task, TaskKind, TaskType};
use crate::storage::{self, FileWriter};

/// The scheduled-task collection together with the file that backs it.
///
/// Every mutator validates, updates the in-memory collection, rewrites the
/// whole file, and only then returns the refreshed collection. A failed write
/// is logged; the in-memory collection stays authoritative for the session.
#[derive(Debug)]
pub struct TaskStore {
    writer: FileWriter,
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Opens the store at `path`, creating an empty file on first run.
    pub fn open(path: impl Into<PathBuf>, write_timeout: Duration) -> Self {
        let path = path.into();
        let tasks: Vec<Task> = storage::load_or_init(&path);
        debug!(path = %path.display(), count = tasks.len(), "task store opened");
        Self {
            writer: FileWriter::new(path, write_timeout),
            tasks,
        }
    }

    /// The full collection in insertion order.
    pub fn load(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Validates `input`, appends a new task with a fresh id, and persists.
    pub fn add(&mut self, input: NewTaskInput) -> Result<&[Task], ValidationError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        let kind = match input.kind {
            TaskType::OneTime => {
                let raw_date = required(&input.date, "date")?;
                let time = required_time(&input.time)?;
                let date = parse_date(raw_date).ok_or_else(|| ValidationError::Malformed {
                    field: "date",
                    value: raw_date.to_string(),
                })?;
                TaskKind::OneTime {
                    date,
                    time,
                    done: false,
                    done_at: None,
                }
            }
            TaskType::Daily => TaskKind::Daily {
                time: required_time(&input.time)?,
                done_dates: Default::default(),
            },
        };

        let id = self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        self.tasks.push(Task {
            id,
            name: name.to_string(),
            created_at: Local::now(),
            deleted: false,
            deleted_at: None,
            kind,
        });
        debug!(id, "task added");
        self.persist();
        Ok(&self.tasks)
    }

    /// Records completion of task `id`. Unknown ids are ignored.
    ///
    /// One-time tasks become done for good. Daily tasks record completion for
    /// `meta.date`, or for today's local date when no date is given; marking
    /// the same day twice changes nothing.
    pub fn mark_done(&mut self, id: u64, meta: DoneMeta) -> &[Task] {
        let Some(idx) = self.position(id) else {
            debug!(id, "mark_done: task not found, ignoring");
            return &self.tasks;
        };
        match &mut self.tasks[idx].kind {
            TaskKind::OneTime { done, done_at, .. } => {
                if !*done {
                    *done = true;
                    *done_at = Some(Local::now());
                }
            }
            TaskKind::Daily { done_dates, .. } => {
                let date = meta.date.unwrap_or_else(|| Local::now().date_naive());
                done_dates.insert(date, true);
            }
        }
        debug!(id, "task marked done");
        self.persist();
        &self.tasks
    }

    /// Soft-deletes task `id`. Unknown ids are ignored.
    pub fn mark_deleted(&mut self, id: u64) -> &[Task] {
        let Some(idx) = self.position(id) else {
            debug!(id, "mark_deleted: task not found, ignoring");
            return &self.tasks;
        };
        let task = &mut self.tasks[idx];
        if !task.deleted {
            task.deleted = true;
            task.deleted_at = Some(Local::now());
        }
        debug!(id, "task marked deleted");
        self.persist();
        &self.tasks
    }

    fn position(&self, id: u64) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    fn persist(&self) {
        if let Err(e) = self.writer.save(&self.tasks) {
            warn!(error = %e, "failed to save tasks; keeping in-memory state");
        }
    }
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, ValidationError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}

fn required_time(value: &Option<String>) -> Result<NaiveTime, ValidationError> {
    let raw = required(value, "time")?;
    parse_time(raw).ok_or_else(|| ValidationError::Malformed {
        field: "time",
        value: raw.to_string(),
    })
}
