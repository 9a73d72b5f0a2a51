use std::time::Duration;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

use stickytask::config::AppConfig;
use stickytask::error::{IpcError, ValidationError};
use stickytask::ipc::{self, Host, Request, Response};
use stickytask::models::{DoneMeta, FastingUpdate, NewTaskInput};
use stickytask::window::{Notification, WindowSignal};

fn host_in(dir: &TempDir) -> Host {
    Host::open(&AppConfig::from_data_dir(dir.path().to_path_buf()))
}

#[test]
fn test_requests_return_full_collection() {
    let dir = TempDir::new().unwrap();
    let (handle, _notes) = ipc::spawn(host_in(&dir));

    assert!(handle.load_tasks().unwrap().is_empty());
    let tasks = handle.add_task(NewTaskInput::daily("Stretch", "09:00")).unwrap();
    assert_eq!(tasks.len(), 1);
    let tasks = handle.add_task(NewTaskInput::one_time("Dentist", "2024-03-14", "15:00")).unwrap();
    assert_eq!(tasks.len(), 2);

    let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let tasks = handle.mark_done(1, DoneMeta::on(d)).unwrap();
    assert!(tasks[0].is_done_on(d));

    let tasks = handle.mark_deleted(2).unwrap();
    assert!(tasks[1].deleted);

    // unknown ids are tolerated
    assert_eq!(handle.mark_deleted(99).unwrap(), tasks);
    assert_eq!(handle.load_tasks().unwrap(), tasks);
}

#[test]
fn test_validation_error_crosses_boundary() {
    let dir = TempDir::new().unwrap();
    let (handle, _notes) = ipc::spawn(host_in(&dir));
    let err = handle.add_task(NewTaskInput::daily("", "09:00")).unwrap_err();
    assert_eq!(err, IpcError::Validation(ValidationError::MissingField("name")));
    assert!(handle.load_tasks().unwrap().is_empty());
}

#[test]
fn test_fasting_requests_merge() {
    let dir = TempDir::new().unwrap();
    let (handle, _notes) = ipc::spawn(host_in(&dir));
    assert_eq!(handle.load_fasting().unwrap().gap_hours, None);
    let state = handle
        .save_fasting(FastingUpdate { gap_hours: Some(14.0), last_meal_time: None })
        .unwrap();
    assert_eq!(state.gap_hours, Some(14.0));
    assert_eq!(handle.load_fasting().unwrap(), state);
}

#[test]
fn test_blur_collapses_and_notifies() {
    let dir = TempDir::new().unwrap();
    let (handle, notes) = ipc::spawn(host_in(&dir));

    handle.signal(WindowSignal::Expand);
    handle.blur();
    assert_eq!(notes.recv_timeout(Duration::from_secs(5)).unwrap(), Notification::Collapsed);

    // requests still answer while notifications are pending or not
    handle.signal(WindowSignal::Expand);
    handle.signal(WindowSignal::LockExpanded);
    handle.blur();
    assert!(handle.load_tasks().unwrap().is_empty());
    assert!(notes.try_recv().is_err());

    let host = handle.shutdown().unwrap();
    assert!(host.window().expanded);
    assert!(host.window().locked);
}

#[test]
fn test_shutdown_returns_host_with_state() {
    let dir = TempDir::new().unwrap();
    let (handle, _notes) = ipc::spawn(host_in(&dir));
    handle.add_task(NewTaskInput::daily("Stretch", "09:00")).unwrap();
    handle
        .save_fasting(FastingUpdate { gap_hours: Some(16.0), last_meal_time: None })
        .unwrap();
    handle.signal(WindowSignal::Close);
    let host = handle.shutdown().unwrap();
    assert_eq!(host.tasks().load().len(), 1);
    assert_eq!(host.fasting().load().gap_hours, Some(16.0));
    assert!(host.window().closed);
}

#[test]
fn test_host_handles_requests_directly() {
    let dir = TempDir::new().unwrap();
    let mut host = host_in(&dir);
    let response = host.handle(Request::AddTask(NewTaskInput::daily("Stretch", "09:00"))).unwrap();
    match response {
        Response::Tasks(tasks) => assert_eq!(tasks.len(), 1),
        other => panic!("unexpected response {:?}", other),
    }
}

#[test]
fn test_requests_decode_from_channel_messages() {
    let msg = json!({
        "channel": "scheduledTasks:markDone",
        "args": { "id": 3, "meta": { "date": "2024-01-01" } }
    });
    let request: Request = serde_json::from_value(msg).unwrap();
    assert_eq!(
        request,
        Request::MarkDone { id: 3, meta: DoneMeta::on(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()) }
    );
    assert_eq!(request.channel(), "scheduledTasks:markDone");

    let add: Request = serde_json::from_value(json!({
        "channel": "scheduledTasks:add",
        "args": { "type": "daily", "name": "Stretch", "time": "09:00" }
    }))
    .unwrap();
    assert_eq!(add, Request::AddTask(NewTaskInput::daily("Stretch", "09:00")));

    let load: Request = serde_json::from_value(json!({ "channel": "scheduledTasks:load" })).unwrap();
    assert_eq!(load, Request::LoadTasks);
}
