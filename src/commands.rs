use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::fasting::{FastingStatus, FastingStore};
use crate::models::{parse_date, DoneMeta, FastingUpdate, NewTaskInput, Task, TaskKind, TaskType};
use crate::schedule::build_upcoming;
use crate::store::TaskStore;

/// Adds a new task. Validation failures are reported and nothing is written.
pub fn cmd_add(store: &mut TaskStore, name: String, kind: TaskType, date: Option<String>, time: Option<String>) {
    let input = NewTaskInput { kind, name, date, time };
    match store.add(input) {
        Ok(tasks) => {
            if let Some(t) = tasks.last() {
                println!("Task added (id = {})", t.id);
            }
        }
        Err(e) => eprintln!("Cannot add task: {}", e),
    }
}

/// Marks a task as done. Daily tasks are marked for `date` (default: today).
pub fn cmd_done(store: &mut TaskStore, id: u64, date: Option<String>) {
    let date = match date.as_deref().map(|d| (d, parse_date(d))) {
        Some((raw, None)) => {
            eprintln!("Invalid date '{}'. Use YYYY-MM-DD.", raw);
            return;
        }
        Some((_, parsed)) => parsed,
        None => None,
    };
    if store.find(id).is_none() {
        println!("Task {} not found; nothing changed.", id);
        return;
    }
    store.mark_done(id, DoneMeta { date });
    println!("Task {} marked as done.", id);
}

/// Soft-deletes a task.
pub fn cmd_delete(store: &mut TaskStore, id: u64) {
    if store.find(id).is_none() {
        println!("Task {} not found; nothing changed.", id);
        return;
    }
    store.mark_deleted(id);
    println!("Task {} deleted.", id);
}

/// Prints what is coming up next, soonest first.
pub fn cmd_upcoming(store: &TaskStore, now: NaiveDateTime) {
    let rows = build_upcoming(store.load(), now);
    if rows.is_empty() {
        println!("Nothing scheduled. Enjoy the quiet.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Repeat").add_attribute(Attribute::Bold),
            Cell::new("When").add_attribute(Attribute::Bold),
        ]);

    for (i, row) in rows.iter().enumerate() {
        let when = Cell::new(&row.label);
        // Highlight the head of the list.
        let when = if i == 0 { when.fg(Color::Green).add_attribute(Attribute::Bold) } else { when };
        table.add_row(vec![
            Cell::new(row.task.id),
            Cell::new(&row.task.name),
            Cell::new(repeat_label(row.task)),
            when,
        ]);
    }

    println!("{table}");
}

/// Lists stored tasks. Deleted tasks are shown only with `all`.
pub fn cmd_list(store: &TaskStore, all: bool, today: chrono::NaiveDate) {
    let tasks: Vec<&Task> = store.load().iter().filter(|t| all || !t.deleted).collect();
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Repeat").add_attribute(Attribute::Bold),
            Cell::new("Schedule").add_attribute(Attribute::Bold),
            Cell::new("Last Done").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for t in tasks {
        let (schedule, last_done, status) = match &t.kind {
            TaskKind::OneTime { date, time, done, done_at } => (
                format!("{} {}", date, time.format("%H:%M")),
                done_at.map(|d| d.format("%Y-%m-%d %H:%M").to_string()).unwrap_or_default(),
                if *done { "Done" } else { "Pending" },
            ),
            TaskKind::Daily { time, .. } => (
                format!("every day {}", time.format("%H:%M")),
                t.last_done_date().map(|d| d.to_string()).unwrap_or_default(),
                if t.is_done_on(today) { "Done today" } else { "Pending" },
            ),
        };
        let (status, color) = if t.deleted {
            ("Deleted", Color::Grey)
        } else if status == "Pending" {
            (status, Color::Yellow)
        } else {
            (status, Color::Green)
        };
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.name),
            Cell::new(repeat_label(t)),
            Cell::new(schedule),
            Cell::new(last_done),
            Cell::new(status).fg(color),
        ]);
    }

    println!("{table}");
}

/// Prints the fasting window relative to `now`.
pub fn cmd_fast_status(fasting: &FastingStore, now: DateTime<Local>) {
    let state = fasting.load();
    match state.status(now) {
        FastingStatus::Unset => {
            if state.gap_hours.is_none() {
                println!("No fasting gap set. Use `fast gap <hours>`.");
            } else {
                println!("No meal logged yet. Use `fast meal`.");
            }
        }
        FastingStatus::Fasting { until, remaining } => {
            println!(
                "Fasting: next meal at {} ({}h {:02}m left)",
                until.format("%a %H:%M"),
                remaining.num_hours(),
                remaining.num_minutes() % 60
            );
        }
        FastingStatus::Open { since } => {
            println!("Eating window open since {}", since.format("%a %H:%M"));
        }
    }
}

/// Logs a meal, at `at` (`YYYY-MM-DD HH:MM`) or now.
pub fn cmd_fast_meal(fasting: &mut FastingStore, at: Option<String>, now: DateTime<Local>) {
    let when = match at {
        Some(raw) => match NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M")
            .ok()
            .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        {
            Some(when) => when,
            None => {
                eprintln!("Invalid meal time '{}'. Use \"YYYY-MM-DD HH:MM\".", raw);
                return;
            }
        },
        None => now,
    };
    fasting.log_meal(when);
    println!("Meal logged at {}.", when.format("%Y-%m-%d %H:%M"));
    cmd_fast_status(fasting, now);
}

/// Sets the gap between meals.
pub fn cmd_fast_gap(fasting: &mut FastingStore, hours: f64) {
    let update = FastingUpdate {
        gap_hours: Some(hours),
        last_meal_time: None,
    };
    match fasting.save(update) {
        Ok(_) => println!("Fasting gap set to {}h.", hours),
        Err(e) => eprintln!("Cannot set gap: {}", e),
    }
}

fn repeat_label(task: &Task) -> &'static str {
    match task.task_type() {
        TaskType::OneTime => "once",
        TaskType::Daily => "daily",
    }
}
