use chrono::{Duration, NaiveDateTime, Timelike};

use crate::models::{Task, TaskKind};
use crate::occurrence::next_occurrence;

/// One row of the upcoming view.
#[derive(Debug, Clone, PartialEq)]
pub struct Upcoming<'a> {
    pub task: &'a Task,
    pub occurrence: NaiveDateTime,
    /// Short human label relative to `now`, e.g. `Today 09:00`.
    pub label: String,
}

/// Builds the sorted list of tasks still ahead of `now`.
///
/// Dropped: deleted tasks, done one-time tasks, one-time tasks whose slot is
/// not strictly after `now`, and daily tasks already done today. Survivors
/// are ordered by occurrence; ties keep insertion order.
pub fn build_upcoming(tasks: &[Task], now: NaiveDateTime) -> Vec<Upcoming<'_>> {
    let today = now.date();
    let mut rows: Vec<Upcoming> = tasks
        .iter()
        .filter(|t| !t.deleted)
        .filter_map(|t| {
            let occurrence = next_occurrence(t, now);
            let visible = match &t.kind {
                TaskKind::OneTime { done, .. } => !*done && occurrence > now,
                TaskKind::Daily { .. } => !t.is_done_on(today),
            };
            visible.then(|| Upcoming {
                task: t,
                occurrence,
                label: occurrence_label(occurrence, now),
            })
        })
        .collect();
    // sort_by_key is stable
    rows.sort_by_key(|row| row.occurrence);
    rows
}

/// The task that fires first, if any.
pub fn next_up<'a, 'b>(rows: &'b [Upcoming<'a>]) -> Option<&'b Upcoming<'a>> {
    rows.first()
}

/// Formats an occurrence relative to the day of `now`.
pub fn occurrence_label(occurrence: NaiveDateTime, now: NaiveDateTime) -> String {
    let days = (occurrence.date() - now.date()).num_days();
    let time = occurrence.format("%H:%M");
    match days {
        0 => format!("Today {}", time),
        1 => format!("Tomorrow {}", time),
        _ => format!("{}", occurrence.format("%a %d %b %H:%M")),
    }
}

/// The start of the minute following `now`; the view goes stale at that point
/// even when nothing was mutated.
pub fn minute_boundary_after(now: NaiveDateTime) -> NaiveDateTime {
    let truncated = now
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);
    truncated + Duration::minutes(1)
}
