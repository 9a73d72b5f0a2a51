use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Caller-supplied fields that were missing or malformed. Raised before any
/// mutation or write happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("invalid {field} '{value}'")]
    Malformed { field: &'static str, value: String },
}

/// File read/write/parse failure. Stores log these and carry on with their
/// in-memory state.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize data for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("write to {path} did not finish within {timeout:?}")]
    Timeout { path: PathBuf, timeout: Duration },
}

/// Failure crossing the UI/host boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IpcError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("host is no longer running")]
    Disconnected,
    #[error("host answered {0} with the wrong response kind")]
    UnexpectedResponse(&'static str),
}
