//! Scheduling core of a sticky-note desk widget: one-time and daily tasks,
//! the upcoming view built from them, a fasting tracker, a pomodoro timer,
//! and the request/response host the widget UI talks to.

pub mod commands;
pub mod config;
pub mod error;
pub mod fasting;
pub mod ipc;
pub mod logging;
pub mod models;
pub mod occurrence;
pub mod pomodoro;
pub mod schedule;
pub mod storage;
pub mod store;
pub mod tui;
pub mod window;

pub use config::AppConfig;
pub use error::{IpcError, PersistenceError, ValidationError};
pub use models::{DoneMeta, FastingState, FastingUpdate, NewTaskInput, Task, TaskKind, TaskType};
pub use schedule::{build_upcoming, Upcoming};
pub use store::TaskStore;
