use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use crate::error::ValidationError;
use crate::models::{FastingState, FastingUpdate};
use crate::storage::{self, FileWriter};

/// Longest gap between meals the tracker accepts: four weeks.
pub const MAX_GAP_HOURS: f64 = 24.0 * 28.0;

/// Where the fasting window stands at a given moment.
#[derive(Debug, Clone, PartialEq)]
pub enum FastingStatus {
    /// No gap or no meal recorded yet.
    Unset,
    /// Still inside the gap; the next meal is allowed at `until`.
    Fasting {
        until: DateTime<Local>,
        remaining: chrono::Duration,
    },
    /// The gap has elapsed since `since`.
    Open { since: DateTime<Local> },
}

impl FastingState {
    /// Earliest time the next meal is allowed.
    pub fn next_meal_at(&self) -> Option<DateTime<Local>> {
        let gap = self.gap_hours.filter(|h| h.is_finite() && *h > 0.0)?;
        let last = self.last_meal_time?;
        let gap = gap_duration(gap)?;
        last.checked_add_signed(gap)
    }

    pub fn status(&self, now: DateTime<Local>) -> FastingStatus {
        match self.next_meal_at() {
            None => FastingStatus::Unset,
            Some(until) if until > now => FastingStatus::Fasting {
                until,
                remaining: until - now,
            },
            Some(since) => FastingStatus::Open { since },
        }
    }

    fn merge(&mut self, update: FastingUpdate) {
        if let Some(gap) = update.gap_hours {
            self.gap_hours = Some(gap);
        }
        if let Some(meal) = update.last_meal_time {
            self.last_meal_time = Some(meal);
        }
    }
}

/// The fasting record together with the file that backs it.
#[derive(Debug)]
pub struct FastingStore {
    writer: FileWriter,
    state: FastingState,
}

impl FastingStore {
    pub fn open(path: impl Into<PathBuf>, write_timeout: Duration) -> Self {
        let path = path.into();
        let state: FastingState = storage::load_or_init(&path);
        Self {
            writer: FileWriter::new(path, write_timeout),
            state,
        }
    }

    pub fn load(&self) -> &FastingState {
        &self.state
    }

    /// Shallow-merges `update` into the stored record, persists, and returns
    /// the merged record.
    pub fn save(&mut self, update: FastingUpdate) -> Result<&FastingState, ValidationError> {
        if let Some(gap) = update.gap_hours {
            if !gap.is_finite() || gap <= 0.0 || gap > MAX_GAP_HOURS {
                return Err(ValidationError::Malformed {
                    field: "gapHours",
                    value: gap.to_string(),
                });
            }
        }
        Ok(self.apply(update))
    }

    /// Records a meal eaten at `at`.
    pub fn log_meal(&mut self, at: DateTime<Local>) -> &FastingState {
        self.apply(FastingUpdate {
            gap_hours: None,
            last_meal_time: Some(at),
        })
    }

    fn apply(&mut self, update: FastingUpdate) -> &FastingState {
        self.state.merge(update);
        debug!(state = ?self.state, "fasting state updated");
        if let Err(e) = self.writer.save(&self.state) {
            warn!(error = %e, "failed to save fasting state; keeping in-memory state");
        }
        &self.state
    }
}

/// Converts a gap in hours to a duration; `None` when it does not fit.
fn gap_duration(hours: f64) -> Option<chrono::Duration> {
    let ms = (hours * 3_600_000.0).round();
    if !ms.is_finite() || ms.abs() >= i64::MAX as f64 {
        return None;
    }
    chrono::Duration::try_milliseconds(ms as i64)
}
