use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::PersistenceError;

/// Loads a JSON document from `path`.
///
/// A missing file is first created holding `T::default()`, so first run and
/// steady state go through the same read. Read or parse failures are logged
/// and yield `T::default()`; callers always get a usable value.
pub fn load_or_init<T>(path: &Path) -> T
where
    T: DeserializeOwned + Serialize + Default,
{
    if !path.exists() {
        debug!(path = %path.display(), "creating missing data file");
        if let Err(e) = write_atomic(path, &T::default()) {
            warn!(error = %e, "could not create data file, starting empty");
            return T::default();
        }
    }
    match read_json(path) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "could not load data file, starting empty");
            T::default()
        }
    }
}

/// Reads and parses a JSON document without any recovery.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PersistenceError> {
    let mut f = OpenOptions::new()
        .read(true)
        .open(path)
        .map_err(|source| io_error(path, source))?;
    let mut s = String::new();
    f.read_to_string(&mut s)
        .map_err(|source| io_error(path, source))?;
    serde_json::from_str(&s).map_err(|source| PersistenceError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialized writer for one data file.
///
/// Writes run on a single long-lived thread, so two writes to the same file
/// never overlap. When several payloads are queued behind a slow write only
/// the newest one is written. `save` waits at most `timeout` for its own
/// write; dropping the writer waits for queued writes to land.
#[derive(Debug)]
pub struct FileWriter {
    path: PathBuf,
    timeout: Duration,
    tx: Option<mpsc::Sender<WriteJob>>,
    worker: Option<JoinHandle<()>>,
}

#[derive(Debug)]
struct WriteJob {
    bytes: Vec<u8>,
    reply: mpsc::Sender<Result<(), PersistenceError>>,
}

impl FileWriter {
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        let path = path.into();
        let (tx, rx) = mpsc::channel::<WriteJob>();
        let target = path.clone();
        let worker = thread::spawn(move || {
            while let Ok(mut job) = rx.recv() {
                // Superseded payloads are dropped; their callers have
                // already given up waiting.
                while let Ok(newer) = rx.try_recv() {
                    job = newer;
                }
                let _ = job.reply.send(write_bytes_atomic(&target, &job.bytes));
            }
        });
        Self {
            path,
            timeout,
            tx: Some(tx),
            worker: Some(worker),
        }
    }

    /// Serializes `value` and overwrites the file with it.
    ///
    /// Returns [`PersistenceError::Timeout`] if the write has not completed
    /// within the writer's timeout; it still lands later unless a newer
    /// payload replaces it first.
    pub fn save<T: Serialize>(&self, value: &T) -> Result<(), PersistenceError> {
        let bytes = to_pretty_json(&self.path, value)?;
        let (reply, done) = mpsc::channel();
        let sent = self
            .tx
            .as_ref()
            .map(|tx| tx.send(WriteJob { bytes, reply }).is_ok())
            .unwrap_or(false);
        if !sent {
            return Err(io_error(
                &self.path,
                std::io::Error::new(std::io::ErrorKind::BrokenPipe, "file writer stopped"),
            ));
        }
        match done.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(_) => Err(PersistenceError::Timeout {
                path: self.path.clone(),
                timeout: self.timeout,
            }),
        }
    }
}

impl Drop for FileWriter {
    fn drop(&mut self) {
        drop(self.tx.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Synchronous atomic write: temp file in the same directory, then rename.
pub fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    let bytes = to_pretty_json(path, value)?;
    write_bytes_atomic(path, &bytes)
}

fn to_pretty_json<T: Serialize>(path: &Path, value: &T) -> Result<Vec<u8>, PersistenceError> {
    serde_json::to_vec_pretty(value).map_err(|source| PersistenceError::Serialize {
        path: path.to_path_buf(),
        source,
    })
}

fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|source| io_error(dir, source))?;
    }
    // Unique temp file per write, renamed over the target.
    let mut tmp = NamedTempFile::new_in(dir).map_err(|source| io_error(dir, source))?;
    tmp.write_all(bytes).map_err(|source| io_error(tmp.path(), source))?;
    tmp.as_file()
        .sync_all()
        .map_err(|source| io_error(tmp.path(), source))?;
    tmp.persist(path)
        .map_err(|e| io_error(path, e.error))?;
    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> PersistenceError {
    PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    }
}
