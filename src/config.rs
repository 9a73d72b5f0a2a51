use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_TASKS_FILE: &str = "scheduled_tasks.json";
pub const DEFAULT_FASTING_FILE: &str = "fasting.json";
pub const LOG_FILE: &str = "stickytask.log";
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);
const ENV_DATA_DIR: &str = "STICKYTASK_DATA_DIR";

/// Resolved file locations and tunables for one run of the widget.
#[derive(Debug, Clone)]
pub struct AppConfig {
    data_dir: PathBuf,
    tasks_path: PathBuf,
    fasting_path: PathBuf,
    write_timeout: Duration,
}

impl AppConfig {
    /// Resolves the data directory and creates it if needed.
    ///
    /// Order: explicit override, `STICKYTASK_DATA_DIR`, the platform's local
    /// data directory (`~/.local/share/stickytask` on Linux), then `./`.
    pub fn discover(data_dir_override: Option<PathBuf>) -> Result<Self> {
        let data_dir = resolve_data_dir(data_dir_override);
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir).with_context(|| {
                format!("Failed to create data directory at {}", data_dir.display())
            })?;
        }
        Ok(Self::from_data_dir(data_dir))
    }

    /// Builds a config rooted at `data_dir` with default file names.
    pub fn from_data_dir(data_dir: PathBuf) -> Self {
        Self {
            tasks_path: data_dir.join(DEFAULT_TASKS_FILE),
            fasting_path: data_dir.join(DEFAULT_FASTING_FILE),
            data_dir,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    /// Overrides the tasks file name inside the data directory.
    pub fn with_tasks_file(mut self, file_name: &str) -> Self {
        self.tasks_path = self.data_dir.join(file_name);
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn tasks_path(&self) -> &Path {
        &self.tasks_path
    }

    pub fn fasting_path(&self) -> &Path {
        &self.fasting_path
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }

    pub fn write_timeout(&self) -> Duration {
        self.write_timeout
    }
}

fn resolve_data_dir(data_dir_override: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = data_dir_override {
        return dir;
    }
    if let Ok(dir) = env::var(ENV_DATA_DIR) {
        return PathBuf::from(dir);
    }
    let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    p.push("stickytask");
    p
}
