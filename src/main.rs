//! # stickytask
//!
//! A small always-on-top style desk widget for the terminal: a clock, a
//! pomodoro focus timer, one-time and daily scheduled tasks, and an
//! intermittent-fasting tracker.
//!
//! ## Usage
//!
//! Run without arguments to open the widget:
//!
//! ```bash
//! stickytask
//! # or explicitly
//! stickytask ui
//! ```
//!
//! **Widget keys**
//! *   `e`: Expand / collapse
//! *   `a`: Add task (one-time or daily)
//! *   `Space`: Mark selected task done (today, for daily tasks)
//! *   `d`: Delete selected task
//! *   `p`: Start / stop a pomodoro (keeps the widget expanded)
//! *   `m`: Log a meal
//! *   `q`: Quit
//!
//! **Command line**
//! ```bash
//! stickytask add "Stand-up" --kind daily --time 09:30
//! stickytask add "Dentist" --date 2025-03-14 --time 15:00
//! stickytask upcoming
//! stickytask done 3
//! stickytask fast gap 16
//! stickytask fast meal
//! ```
//!
//! ## Data Storage
//!
//! `scheduled_tasks.json` and `fasting.json` live in the local data
//! directory (`~/.local/share/stickytask` on Linux). Override it with
//! `--data-dir` or the `STICKYTASK_DATA_DIR` environment variable.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing::info;

use stickytask::commands::*;
use stickytask::config::AppConfig;
use stickytask::fasting::FastingStore;
use stickytask::logging;
use stickytask::models::TaskType;
use stickytask::store::TaskStore;
use stickytask::tui::run_tui;

#[derive(Parser)]
#[command(name = "stickytask")]
#[command(about = "Desk widget: clock, pomodoro, scheduled tasks and fasting tracker", long_about = None)]
struct Cli {
    /// Directory holding the data files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// File name of the task collection inside the data directory
    #[arg(long, global = true)]
    tasks_file: Option<String>,
    /// Give up on a file write after this many milliseconds
    #[arg(long, global = true)]
    write_timeout_ms: Option<u64>,
    /// More log output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task name (quoted if it has spaces)
        name: String,
        /// One-time or daily
        #[arg(short, long, value_enum, default_value_t = TaskType::OneTime)]
        kind: TaskType,
        /// Date in YYYY-MM-DD (one-time tasks)
        #[arg(short, long)]
        date: Option<String>,
        /// Time of day in HH:MM
        #[arg(short, long)]
        time: Option<String>,
    },
    /// Show upcoming tasks, soonest first
    Upcoming,
    /// List stored tasks
    List {
        /// Include deleted tasks
        #[arg(short, long)]
        all: bool,
    },
    /// Mark a task as done
    Done {
        id: u64,
        /// Day to mark a daily task done for (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Delete a task
    Delete {
        id: u64,
    },
    /// Intermittent-fasting tracker
    Fast {
        #[command(subcommand)]
        command: FastCommands,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open the widget
    Ui,
}

#[derive(Subcommand)]
enum FastCommands {
    /// Show the current fasting window
    Status,
    /// Log a meal
    Meal {
        /// Meal time as "YYYY-MM-DD HH:MM" (default now)
        #[arg(short, long)]
        at: Option<String>,
    },
    /// Set the gap between meals in hours
    Gap {
        hours: f64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::discover(cli.data_dir)?;
    if let Some(name) = &cli.tasks_file {
        config = config.with_tasks_file(name);
    }
    if let Some(ms) = cli.write_timeout_ms {
        config = config.with_write_timeout(Duration::from_millis(ms));
    }

    let command = cli.command.unwrap_or(Commands::Ui);
    if !matches!(command, Commands::Ui) {
        logging::init_stderr(cli.verbose)?;
    }

    let now = Local::now();
    let tasks = || TaskStore::open(config.tasks_path(), config.write_timeout());
    let fasting = || FastingStore::open(config.fasting_path(), config.write_timeout());

    match command {
        Commands::Ui => {
            logging::init_file(cli.verbose, &config.log_path())?;
            info!(data_dir = %config.data_dir().display(), "starting widget");
            run_tui(&config)?;
        }
        Commands::Add { name, kind, date, time } => cmd_add(&mut tasks(), name, kind, date, time),
        Commands::Upcoming => cmd_upcoming(&tasks(), now.naive_local()),
        Commands::List { all } => cmd_list(&tasks(), all, now.date_naive()),
        Commands::Done { id, date } => cmd_done(&mut tasks(), id, date),
        Commands::Delete { id } => cmd_delete(&mut tasks(), id),
        Commands::Fast { command } => match command {
            FastCommands::Status => cmd_fast_status(&fasting(), now),
            FastCommands::Meal { at } => cmd_fast_meal(&mut fasting(), at, now),
            FastCommands::Gap { hours } => cmd_fast_gap(&mut fasting(), hours),
        },
        Commands::Completions { shell } => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => anyhow::bail!("Unsupported shell: {}", shell),
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "stickytask", &mut io::stdout());
        }
    }
    Ok(())
}
