use chrono::{Duration, NaiveDateTime};
use crate::models::{Task, TaskKind};

/// Computes the next concrete local date-time at which `task` fires.
///
/// - One-time: exactly `date` + `time`, whether or not that is in the past.
/// - Daily: today at `time` if that is strictly after `now`, otherwise
///   tomorrow at `time`.
///
/// Completion state is not consulted; the view builder filters done tasks.
pub fn next_occurrence(task: &Task, now: NaiveDateTime) -> NaiveDateTime {
    match &task.kind {
        TaskKind::OneTime { date, time, .. } => date.and_time(*time),
        TaskKind::Daily { time, .. } => {
            let today = now.date().and_time(*time);
            if today > now {
                today
            } else {
                today + Duration::days(1)
            }
        }
    }
}
