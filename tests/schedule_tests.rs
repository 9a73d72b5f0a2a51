use std::collections::BTreeMap;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use pretty_assertions::assert_eq;
use rstest::rstest;

use stickytask::models::{Task, TaskKind};
use stickytask::occurrence::next_occurrence;
use stickytask::schedule::{build_upcoming, minute_boundary_after, next_up, occurrence_label};

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

fn base(id: u64, name: &str, kind: TaskKind) -> Task {
    Task {
        id,
        name: name.into(),
        created_at: Local.with_ymd_and_hms(2023, 12, 1, 8, 0, 0).unwrap(),
        deleted: false,
        deleted_at: None,
        kind,
    }
}

fn daily(id: u64, hm: &str, done_on: &[&str]) -> Task {
    let done_dates: BTreeMap<NaiveDate, bool> = done_on.iter().map(|d| (date(d), true)).collect();
    base(id, "daily", TaskKind::Daily { time: time(hm), done_dates })
}

fn once(id: u64, day: &str, hm: &str, done: bool) -> Task {
    base(id, "once", TaskKind::OneTime { date: date(day), time: time(hm), done, done_at: None })
}

fn ids(tasks: &[Task], now: NaiveDateTime) -> Vec<u64> {
    build_upcoming(tasks, now).iter().map(|u| u.task.id).collect()
}

#[rstest]
#[case("2024-01-01T10:00", "2024-01-02T09:00")]
#[case("2024-01-01T08:00", "2024-01-01T09:00")]
#[case("2024-01-01T09:00", "2024-01-02T09:00")]
#[case("2024-12-31T23:59", "2025-01-01T09:00")]
fn test_daily_occurrence(#[case] now: &str, #[case] expected: &str) {
    let task = daily(1, "09:00", &[]);
    assert_eq!(next_occurrence(&task, at(now)), at(expected));
}

#[test]
fn test_daily_occurrence_ignores_done_dates() {
    let task = daily(1, "09:00", &["2024-01-01"]);
    assert_eq!(next_occurrence(&task, at("2024-01-01T08:00")), at("2024-01-01T09:00"));
}

#[test]
fn test_one_time_occurrence_is_fixed() {
    let task = once(1, "2024-03-14", "15:00", false);
    assert_eq!(next_occurrence(&task, at("2024-01-01T00:00")), at("2024-03-14T15:00"));
    assert_eq!(next_occurrence(&task, at("2025-01-01T00:00")), at("2024-03-14T15:00"));
}

#[test]
fn test_daily_done_today_is_hidden_until_tomorrow() {
    let tasks = vec![daily(1, "09:00", &["2024-01-01"])];
    assert!(build_upcoming(&tasks, at("2024-01-01T12:00")).is_empty());

    let rows = build_upcoming(&tasks, at("2024-01-02T00:01"));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].occurrence, at("2024-01-02T09:00"));
}

#[test]
fn test_past_one_time_is_excluded_even_when_not_done() {
    let tasks = vec![once(1, "2024-01-01", "09:00", false)];
    assert!(build_upcoming(&tasks, at("2024-01-01T09:30")).is_empty());
    // exactly at the slot is no longer upcoming
    assert!(build_upcoming(&tasks, at("2024-01-01T09:00")).is_empty());
    assert_eq!(ids(&tasks, at("2024-01-01T08:59")), vec![1]);
}

#[test]
fn test_done_one_time_is_excluded() {
    let tasks = vec![once(1, "2024-06-01", "09:00", true), once(2, "2024-06-01", "10:00", false)];
    assert_eq!(ids(&tasks, at("2024-01-01T00:00")), vec![2]);
}

#[test]
fn test_deleted_tasks_never_appear() {
    let mut tasks = vec![
        daily(1, "09:00", &[]),
        once(2, "2030-01-01", "09:00", false),
        daily(3, "07:00", &["2024-01-01"]),
        once(4, "2030-01-01", "08:00", true),
    ];
    for t in tasks.iter_mut() {
        t.deleted = true;
    }
    for now in ["2024-01-01T00:00", "2024-01-01T12:00", "2029-12-31T23:59"] {
        assert!(build_upcoming(&tasks, at(now)).iter().all(|u| !u.task.deleted));
        assert!(build_upcoming(&tasks, at(now)).is_empty());
    }
}

#[test]
fn test_sorted_by_occurrence_with_stable_ties() {
    let tasks = vec![
        once(1, "2024-01-02", "09:00", false),
        daily(2, "09:00", &[]),
        daily(3, "07:30", &[]),
        once(4, "2024-01-01", "18:00", false),
        daily(5, "09:00", &[]),
    ];
    // at 08:00 on Jan 1: daily 07:30 rolls to tomorrow
    assert_eq!(ids(&tasks, at("2024-01-01T08:00")), vec![2, 5, 4, 3, 1]);
}

#[test]
fn test_next_up_and_empty_state() {
    let tasks = vec![daily(1, "21:00", &[]), daily(2, "06:00", &[])];
    let rows = build_upcoming(&tasks, at("2024-01-01T05:00"));
    assert_eq!(next_up(&rows).map(|u| u.task.id), Some(2));

    let none: Vec<Task> = Vec::new();
    let rows = build_upcoming(&none, at("2024-01-01T05:00"));
    assert!(next_up(&rows).is_none());
}

#[rstest]
#[case("2024-01-01T09:00", "Today 09:00")]
#[case("2024-01-02T09:00", "Tomorrow 09:00")]
#[case("2024-01-05T18:30", "Fri 05 Jan 18:30")]
fn test_occurrence_labels(#[case] occurrence: &str, #[case] expected: &str) {
    assert_eq!(occurrence_label(at(occurrence), at("2024-01-01T08:00")), expected);
}

#[test]
fn test_minute_boundary() {
    let now = NaiveDateTime::parse_from_str("2024-01-01T08:15:42", "%Y-%m-%dT%H:%M:%S").unwrap();
    assert_eq!(minute_boundary_after(now), at("2024-01-01T08:16"));
    assert_eq!(minute_boundary_after(at("2024-01-01T23:59")), at("2024-01-02T00:00"));
}
