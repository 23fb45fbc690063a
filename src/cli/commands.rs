use crate::cli::abbrev;
use crate::cli::error::{internal_error, user_error, validate_stage_id};
use crate::cli::output::{
    format_job_list, format_stage_overview, format_status, format_watch_line, get_terminal_width, is_tty,
    overview_json, status_json,
};
use crate::cli::shell;
use crate::config::Config;
use crate::driver;
use crate::engine::{ShiftAction, StageError};
use crate::models::{default_job_ids, default_roster, JobInfo};
use crate::store::{SqliteStorage, Store, SystemClock};
use crate::utils::{fuzzy, parse_duration};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{IsTerminal, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "shopclock")]
#[command(about = "Shop-floor stage and shift clock - tracks repair jobs through ten work stages")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show shift, lock state and running stages
    Status {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// List jobs with their status
    Jobs {
        /// Search by job id, registration or customer
        #[arg(trailing_var_arg = true)]
        query: Vec<String>,
    },
    /// Show the stage overview of a job
    Show {
        /// Job id (a unique suffix such as 788 is enough)
        job: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Shift clock commands
    Clock {
        #[command(subcommand)]
        action: ClockCommands,
    },
    /// Stage commands
    Stage {
        #[command(subcommand)]
        subcommand: StageCommands,
    },
    /// Run the tick driver and print a status line as time passes
    Watch {
        /// How long to run (e.g. 90, 30s, 5m, 1h30m); runs until interrupted if omitted
        #[arg(long = "for")]
        duration: Option<String>,
    },
    /// Interactive session with live timers; starts locked
    Shell,
    /// Discard all stored state and start fresh
    Reset {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand, Clone, Copy)]
pub enum ClockCommands {
    /// Clock on (OFF -> ON)
    On,
    /// Pause the shift (ON -> PAUSED)
    Pause,
    /// Resume the shift (PAUSED -> ON)
    Resume,
    /// Clock off (ON or PAUSED -> OFF)
    Off,
}

impl ClockCommands {
    pub fn action(self) -> ShiftAction {
        match self {
            ClockCommands::On => ShiftAction::ClockOn,
            ClockCommands::Pause => ShiftAction::Pause,
            ClockCommands::Resume => ShiftAction::Resume,
            ClockCommands::Off => ShiftAction::ClockOff,
        }
    }
}

#[derive(Subcommand, Clone)]
pub enum StageCommands {
    /// Start or resume a stage
    Start {
        job: String,
        stage: u32,
        /// Switch away from another running stage without asking
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Pause whatever is running and start this stage
    Switch { job: String, stage: u32 },
    /// Pause a running stage
    Pause { job: String, stage: u32 },
    /// Sign off a started stage
    Complete { job: String, stage: u32 },
}

pub fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let args = match abbrev::expand_command_abbreviations(args, abbrev::TOP_LEVEL_COMMANDS) {
        Ok(expanded) => expanded,
        Err(e) => user_error(&e),
    };

    let clap_args = std::iter::once("shopclock".to_string()).chain(args);
    let cli = match Cli::try_parse_from(clap_args) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    handle_command(cli)
}

fn handle_command(cli: Cli) -> Result<()> {
    let store = open_store()?;

    match cli.command {
        Commands::Status { json } => handle_status(&store, json),
        Commands::Jobs { query } => handle_jobs(&store, &query.join(" ")),
        Commands::Show { job, json } => handle_show(&store, &job, json),
        Commands::Clock { action } => {
            // A one-shot command is an explicit unlock gesture
            store.unlock();
            print_outcome(run_clock(&store, action))
        }
        Commands::Stage { subcommand } => {
            store.unlock();
            let interactive = std::io::stdin().is_terminal();
            print_outcome(run_stage(&store, subcommand, interactive))
        }
        Commands::Watch { duration } => handle_watch(&store, duration),
        Commands::Shell => shell::run_shell(store),
        Commands::Reset { yes } => handle_reset(&store, yes),
    }
}

/// Open the configured database and load the store
pub fn open_store() -> Result<Store> {
    let config = Config::load().context("Failed to load configuration")?;
    let storage = SqliteStorage::open(&config.data_location)
        .with_context(|| format!("Failed to open database: {}", config.data_location.display()))?;
    Ok(Store::open(Box::new(storage), Arc::new(SystemClock), config, default_job_ids()))
}

fn print_outcome(outcome: std::result::Result<String, String>) -> Result<()> {
    match outcome {
        Ok(message) => {
            println!("{}", message);
            Ok(())
        }
        Err(message) => user_error(&message),
    }
}

/// Resolve a job argument to a stored job id: exact id (any case) or a unique suffix
pub fn resolve_job(store: &Store, query: &str) -> std::result::Result<String, String> {
    let job_ids: Vec<String> = store.snapshot().stages.keys().cloned().collect();

    if let Some(id) = job_ids.iter().find(|id| id.eq_ignore_ascii_case(query)) {
        return Ok(id.clone());
    }

    let suffixed = fuzzy::suffix_matches(query, &job_ids);
    match suffixed.len() {
        1 => return Ok(suffixed[0].clone()),
        n if n > 1 && !query.is_empty() => {
            let names: Vec<&str> = suffixed.iter().map(|s| s.as_str()).collect();
            return Err(format!("Job '{}' is ambiguous. Did you mean one of: {}?", query, names.join(", ")));
        }
        _ => {}
    }

    let near = fuzzy::find_near_matches(query, &job_ids, 3);
    if near.is_empty() {
        Err(format!("Job '{}' not found.", query))
    } else {
        let names: Vec<String> = near.into_iter().map(|(name, _)| name).collect();
        Err(format!("Job '{}' not found. Did you mean: {}?", query, names.join(", ")))
    }
}

fn roster_entry(job_id: &str) -> Option<JobInfo> {
    default_roster().into_iter().find(|j| j.id == job_id)
}

pub fn handle_status(store: &Store, json: bool) -> Result<()> {
    let state = store.snapshot();
    if json {
        println!("{}", serde_json::to_string_pretty(&status_json(&state))?);
    } else {
        print!("{}", format_status(&state, is_tty()));
    }
    Ok(())
}

pub fn handle_jobs(store: &Store, query: &str) -> Result<()> {
    let state = store.snapshot();
    let roster: Vec<JobInfo> = default_roster().into_iter().filter(|j| j.matches(query)).collect();
    print!("{}", format_job_list(&roster, &state, is_tty(), get_terminal_width()));
    Ok(())
}

pub fn handle_show(store: &Store, job: &str, json: bool) -> Result<()> {
    let job_id = resolve_job(store, job).unwrap_or_else(|e| user_error(&e));
    show_job(store, &job_id, json)
}

/// Print one job's overview. `job_id` must already be resolved.
pub fn show_job(store: &Store, job_id: &str, json: bool) -> Result<()> {
    let state = store.snapshot();
    let Some(job) = state.stages.get(job_id) else {
        anyhow::bail!("Job {} disappeared from the store", job_id);
    };
    let info = roster_entry(job_id);

    if json {
        let value = overview_json(job_id, info.as_ref(), job, store.user());
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", format_stage_overview(job_id, info.as_ref(), job, store.user(), is_tty()));
    }
    Ok(())
}

/// Apply a shift action and describe the result
pub fn run_clock(store: &Store, action: ClockCommands) -> std::result::Result<String, String> {
    let action = action.action();
    let before = store.snapshot().shift.status;

    if store.shift_action(action) {
        let shift = store.snapshot().shift;
        Ok(format!("Shift {} -> {}.", before.as_str(), shift.status.as_str()))
    } else if store.is_locked() {
        Err(StageError::Locked.to_string())
    } else {
        Err(format!("Cannot {} the shift while it is {}.", action_verb(action), before.as_str()))
    }
}

fn action_verb(action: ShiftAction) -> &'static str {
    match action {
        ShiftAction::ClockOn => "clock on",
        ShiftAction::Pause => "pause",
        ShiftAction::Resume => "resume",
        ShiftAction::ClockOff => "clock off",
    }
}

/// Ask a yes/no question on stderr. Empty input means no.
pub fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{} (y/n): ", prompt);
    std::io::stderr().flush().map_err(|e| anyhow::anyhow!("Failed to flush stderr: {}", e))?;

    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .map_err(|e| anyhow::anyhow!("Failed to read input: {}", e))?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Apply a stage command. With `interactive`, a start conflict asks before switching.
pub fn run_stage(store: &Store, command: StageCommands, interactive: bool) -> std::result::Result<String, String> {
    let (job, stage) = match &command {
        StageCommands::Start { job, stage, .. }
        | StageCommands::Switch { job, stage }
        | StageCommands::Pause { job, stage }
        | StageCommands::Complete { job, stage } => (job.clone(), *stage),
    };
    let job_id = resolve_job(store, &job)?;
    let stage_id = validate_stage_id(stage)?;
    let label = store
        .snapshot()
        .stage(&job_id, stage_id)
        .map(|s| format!("{} ({}, stage {})", s.name, job_id, stage_id))
        .unwrap_or_else(|| format!("{} stage {}", job_id, stage_id));

    let result = match command {
        StageCommands::Start { yes, .. } => match store.start_stage(&job_id, stage_id) {
            Err(StageError::OtherRunning(running)) => {
                let switch = yes
                    || (interactive
                        && confirm(&format!("{} is already running. Switch to {}?", running, label))
                            .map_err(|e| e.to_string())?);
                if !switch {
                    return Err(format!(
                        "{} Use `stage switch {} {}` or `-y`.",
                        StageError::OtherRunning(running),
                        job_id,
                        stage_id
                    ));
                }
                store
                    .switch_and_start(&job_id, stage_id)
                    .map(|_| format!("Paused {}. Started {}.", running, label))
            }
            other => other.map(|_| format!("Started {}.", label)),
        },
        StageCommands::Switch { .. } => store.switch_and_start(&job_id, stage_id).map(|_| format!("Started {}.", label)),
        StageCommands::Pause { .. } => store.pause_stage(&job_id, stage_id).map(|_| format!("Paused {}.", label)),
        StageCommands::Complete { .. } => {
            store.complete_stage(&job_id, stage_id).map(|_| format!("Signed off {}.", label))
        }
    };

    result.map_err(|e| e.to_string())
}

fn handle_watch(store: &Store, duration: Option<String>) -> Result<()> {
    let limit = match duration {
        Some(expr) => Some(Duration::from_secs(
            parse_duration(&expr).unwrap_or_else(|e| user_error(&e.to_string())),
        )),
        None => None,
    };
    let started = Instant::now();
    let period = Duration::from_millis(store.config().tick_ms.max(1));

    let _ticker = driver::spawn_tick_driver(store.clone());
    println!("{}", format_watch_line(&store.snapshot()));

    let mut seen = store.version();
    loop {
        if let Some(limit) = limit {
            if started.elapsed() >= limit {
                break;
            }
        }
        std::thread::sleep(period);
        let version = store.version();
        if version != seen {
            seen = version;
            println!("{}", format_watch_line(&store.snapshot()));
        }
    }
    Ok(())
}

fn handle_reset(store: &Store, yes: bool) -> Result<()> {
    if !yes {
        if !std::io::stdin().is_terminal() {
            user_error("Refusing to reset without confirmation. Use -y to skip the prompt.");
        }
        if !confirm("This discards every shift and stage record. Continue?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }
    store.reset();
    println!("State reset.");
    Ok(())
}

/// Entry point helper for `main`: run and map errors to exit codes
pub fn run_and_exit() {
    if let Err(e) = run() {
        internal_error(&e);
    }
}
