use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A scheduled task, as persisted in `scheduled_tasks.json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, assigned by the store at creation.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// When the task was created.
    pub created_at: DateTime<Local>,
    /// Soft-delete flag. Deleted tasks stay in the file.
    #[serde(default)]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Local>>,
    /// Variant-specific schedule and completion state.
    #[serde(flatten)]
    pub kind: TaskKind,
}

/// Schedule of a task, tagged by `"type"` in the JSON record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TaskKind {
    /// Fires once at `date` + `time`. Terminal once done.
    #[serde(rename_all = "camelCase")]
    OneTime {
        date: NaiveDate,
        #[serde(with = "hour_minute")]
        time: NaiveTime,
        #[serde(default)]
        done: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        done_at: Option<DateTime<Local>>,
    },
    /// Fires every day at `time`; completion is tracked per calendar day.
    #[serde(rename_all = "camelCase")]
    Daily {
        #[serde(with = "hour_minute")]
        time: NaiveTime,
        #[serde(default)]
        done_dates: BTreeMap<NaiveDate, bool>,
    },
}

impl Task {
    pub fn task_type(&self) -> TaskType {
        match self.kind {
            TaskKind::OneTime { .. } => TaskType::OneTime,
            TaskKind::Daily { .. } => TaskType::Daily,
        }
    }

    pub fn time(&self) -> NaiveTime {
        match &self.kind {
            TaskKind::OneTime { time, .. } | TaskKind::Daily { time, .. } => *time,
        }
    }

    /// Whether a daily task was completed on `date`. Always false for one-time tasks.
    pub fn is_done_on(&self, date: NaiveDate) -> bool {
        match &self.kind {
            TaskKind::Daily { done_dates, .. } => done_dates.get(&date).copied().unwrap_or(false),
            TaskKind::OneTime { .. } => false,
        }
    }

    /// Most recent completion day of a daily task, derived from `done_dates`.
    pub fn last_done_date(&self) -> Option<NaiveDate> {
        match &self.kind {
            TaskKind::Daily { done_dates, .. } => done_dates
                .iter()
                .rev()
                .find(|(_, done)| **done)
                .map(|(date, _)| *date),
            TaskKind::OneTime { .. } => None,
        }
    }
}

/// Which variant a new task should be created as.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum TaskType {
    OneTime,
    Daily,
}

/// Unvalidated creation payload, as received from the UI.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewTaskInput {
    #[serde(rename = "type")]
    pub kind: TaskType,
    #[serde(default)]
    pub name: String,
    /// `YYYY-MM-DD`, required for one-time tasks.
    #[serde(default)]
    pub date: Option<String>,
    /// `HH:MM`, required for both variants.
    #[serde(default)]
    pub time: Option<String>,
}

impl NewTaskInput {
    pub fn one_time(name: impl Into<String>, date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            kind: TaskType::OneTime,
            name: name.into(),
            date: Some(date.into()),
            time: Some(time.into()),
        }
    }

    pub fn daily(name: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            kind: TaskType::Daily,
            name: name.into(),
            date: None,
            time: Some(time.into()),
        }
    }
}

/// Extra data for `mark_done`. Daily tasks record completion against `date`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DoneMeta {
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl DoneMeta {
    pub fn on(date: NaiveDate) -> Self {
        Self { date: Some(date) }
    }
}

/// Intermittent-fasting tracker state, persisted in `fasting.json`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FastingState {
    /// Hours to wait between meals.
    #[serde(default)]
    pub gap_hours: Option<f64>,
    #[serde(default)]
    pub last_meal_time: Option<DateTime<Local>>,
}

/// Partial fasting record. Fields left as `None` keep their stored value.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FastingUpdate {
    #[serde(default)]
    pub gap_hours: Option<f64>,
    #[serde(default)]
    pub last_meal_time: Option<DateTime<Local>>,
}

/// `HH:MM` (de)serialization for task times.
mod hour_minute {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_time(&raw).ok_or_else(|| de::Error::custom(format!("invalid time '{}'", raw)))
    }
}

/// Parses `HH:MM`, also accepting `HH:MM:SS`.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}
