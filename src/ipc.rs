//! Request/response boundary between the UI and the host that owns the
//! stores.
//!
//! The host runs on a single worker thread, so requests are applied one at a
//! time in arrival order. Window signals and host notifications travel on
//! their own channels and may interleave with request traffic.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::{IpcError, ValidationError};
use crate::fasting::FastingStore;
use crate::models::{DoneMeta, FastingState, FastingUpdate, NewTaskInput, Task};
use crate::store::TaskStore;
use crate::window::{Notification, WindowSignal, WindowState};

/// Requests the UI may invoke, named by channel on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "channel", content = "args")]
pub enum Request {
    #[serde(rename = "scheduledTasks:load")]
    LoadTasks,
    #[serde(rename = "scheduledTasks:add")]
    AddTask(NewTaskInput),
    #[serde(rename = "scheduledTasks:markDone")]
    MarkDone {
        id: u64,
        #[serde(default)]
        meta: DoneMeta,
    },
    #[serde(rename = "scheduledTasks:markDeleted")]
    MarkDeleted { id: u64 },
    #[serde(rename = "fasting:load")]
    LoadFasting,
    #[serde(rename = "fasting:save")]
    SaveFasting(FastingUpdate),
}

impl Request {
    pub fn channel(&self) -> &'static str {
        match self {
            Request::LoadTasks => "scheduledTasks:load",
            Request::AddTask(_) => "scheduledTasks:add",
            Request::MarkDone { .. } => "scheduledTasks:markDone",
            Request::MarkDeleted { .. } => "scheduledTasks:markDeleted",
            Request::LoadFasting => "fasting:load",
            Request::SaveFasting(_) => "fasting:save",
        }
    }
}

/// Task requests answer with the whole refreshed collection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum Response {
    Tasks(Vec<Task>),
    Fasting(FastingState),
}

/// Privileged side: owns the stores and the window state.
#[derive(Debug)]
pub struct Host {
    tasks: TaskStore,
    fasting: FastingStore,
    window: WindowState,
}

impl Host {
    pub fn new(tasks: TaskStore, fasting: FastingStore) -> Self {
        Self {
            tasks,
            fasting,
            window: WindowState::default(),
        }
    }

    /// Opens both stores at the locations in `config`.
    pub fn open(config: &AppConfig) -> Self {
        Self::new(
            TaskStore::open(config.tasks_path(), config.write_timeout()),
            FastingStore::open(config.fasting_path(), config.write_timeout()),
        )
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    pub fn fasting(&self) -> &FastingStore {
        &self.fasting
    }

    pub fn window(&self) -> &WindowState {
        &self.window
    }

    /// Applies one request. Only validation failures come back as errors.
    pub fn handle(&mut self, request: Request) -> Result<Response, ValidationError> {
        debug!(channel = request.channel(), "handling request");
        let response = match request {
            Request::LoadTasks => Response::Tasks(self.tasks.load().to_vec()),
            Request::AddTask(input) => Response::Tasks(self.tasks.add(input)?.to_vec()),
            Request::MarkDone { id, meta } => Response::Tasks(self.tasks.mark_done(id, meta).to_vec()),
            Request::MarkDeleted { id } => Response::Tasks(self.tasks.mark_deleted(id).to_vec()),
            Request::LoadFasting => Response::Fasting(self.fasting.load().clone()),
            Request::SaveFasting(update) => Response::Fasting(self.fasting.save(update)?.clone()),
        };
        Ok(response)
    }

    pub fn signal(&mut self, signal: WindowSignal) {
        debug!(channel = signal.channel(), "window signal");
        self.window.apply(signal);
    }

    pub fn focus_lost(&mut self) -> Option<Notification> {
        self.window.focus_lost()
    }
}

enum Envelope {
    Invoke(Request, Sender<Result<Response, ValidationError>>),
    Signal(WindowSignal),
    Blur,
}

/// Runs `host` on a worker thread.
///
/// Returns the UI-side handle and the receiver for host notifications.
pub fn spawn(mut host: Host) -> (HostHandle, Receiver<Notification>) {
    let (tx, rx) = mpsc::channel::<Envelope>();
    let (notify_tx, notify_rx) = mpsc::channel();
    let worker = thread::spawn(move || {
        info!("host started");
        for envelope in rx {
            match envelope {
                Envelope::Invoke(request, reply) => {
                    let _ = reply.send(host.handle(request));
                }
                Envelope::Signal(signal) => host.signal(signal),
                Envelope::Blur => {
                    if let Some(note) = host.focus_lost() {
                        let _ = notify_tx.send(note);
                    }
                }
            }
        }
        info!("host stopped");
        host
    });
    let handle = HostHandle {
        tx: Some(tx),
        worker: Some(worker),
    };
    (handle, notify_rx)
}

/// UI-side handle. Each call blocks until the host has answered.
pub struct HostHandle {
    tx: Option<Sender<Envelope>>,
    worker: Option<JoinHandle<Host>>,
}

impl HostHandle {
    pub fn invoke(&self, request: Request) -> Result<Response, IpcError> {
        let tx = self.tx.as_ref().ok_or(IpcError::Disconnected)?;
        let (reply_tx, reply_rx) = mpsc::channel();
        tx.send(Envelope::Invoke(request, reply_tx))
            .map_err(|_| IpcError::Disconnected)?;
        let result = reply_rx.recv().map_err(|_| IpcError::Disconnected)?;
        Ok(result?)
    }

    pub fn load_tasks(&self) -> Result<Vec<Task>, IpcError> {
        expect_tasks(self.invoke(Request::LoadTasks)?, "scheduledTasks:load")
    }

    pub fn add_task(&self, input: NewTaskInput) -> Result<Vec<Task>, IpcError> {
        expect_tasks(self.invoke(Request::AddTask(input))?, "scheduledTasks:add")
    }

    pub fn mark_done(&self, id: u64, meta: DoneMeta) -> Result<Vec<Task>, IpcError> {
        expect_tasks(self.invoke(Request::MarkDone { id, meta })?, "scheduledTasks:markDone")
    }

    pub fn mark_deleted(&self, id: u64) -> Result<Vec<Task>, IpcError> {
        expect_tasks(self.invoke(Request::MarkDeleted { id })?, "scheduledTasks:markDeleted")
    }

    pub fn load_fasting(&self) -> Result<FastingState, IpcError> {
        expect_fasting(self.invoke(Request::LoadFasting)?, "fasting:load")
    }

    pub fn save_fasting(&self, update: FastingUpdate) -> Result<FastingState, IpcError> {
        expect_fasting(self.invoke(Request::SaveFasting(update))?, "fasting:save")
    }

    /// Fire-and-forget window signal.
    pub fn signal(&self, signal: WindowSignal) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(Envelope::Signal(signal));
        }
    }

    /// Reports that the window lost input focus.
    pub fn blur(&self) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(Envelope::Blur);
        }
    }

    /// Stops the worker after it drains queued messages and hands the host back.
    pub fn shutdown(mut self) -> Option<Host> {
        self.stop()
    }

    fn stop(&mut self) -> Option<Host> {
        drop(self.tx.take());
        self.worker.take().and_then(|w| w.join().ok())
    }
}

impl Drop for HostHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn expect_tasks(response: Response, channel: &'static str) -> Result<Vec<Task>, IpcError> {
    match response {
        Response::Tasks(tasks) => Ok(tasks),
        Response::Fasting(_) => Err(IpcError::UnexpectedResponse(channel)),
    }
}

fn expect_fasting(response: Response, channel: &'static str) -> Result<FastingState, IpcError> {
    match response {
        Response::Fasting(state) => Ok(state),
        Response::Tasks(_) => Err(IpcError::UnexpectedResponse(channel)),
    }
}
