// Interactive shell: one store, live tick and lock timers, one command per line.
//
// The shell starts locked. `unlock` opens the controls; after the configured
// idle timeout the watchdog locks them again.

use crate::cli::abbrev;
use crate::cli::commands::{confirm, handle_jobs, handle_status, resolve_job, run_clock, run_stage, show_job, ClockCommands, StageCommands};
use crate::cli::output::format_status;
use crate::driver::Timers;
use crate::engine::StageError;
use crate::store::Store;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{BufRead, IsTerminal, Write};

#[derive(Parser)]
#[command(name = "shopclock", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand)]
enum ShellCommand {
    /// Show shift, lock state and running stages
    Status {
        #[arg(long)]
        json: bool,
    },
    /// List jobs with their status
    Jobs {
        #[arg(trailing_var_arg = true)]
        query: Vec<String>,
    },
    /// Show the stage overview of a job
    Show {
        job: String,
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
    /// Lock the controls
    Lock,
    /// Unlock the controls
    Unlock,
    /// Open or close the shift drawer
    Drawer {
        #[command(subcommand)]
        action: DrawerCommands,
    },
    /// Discard all stored state and start fresh
    Reset,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

#[derive(Subcommand, Clone, Copy)]
enum DrawerCommands {
    Open,
    Close,
}

enum Flow {
    Continue,
    Quit,
}

fn prompt(store: &Store) -> String {
    if store.is_locked() {
        "shopclock [locked]> ".to_string()
    } else {
        "shopclock> ".to_string()
    }
}

fn report(outcome: std::result::Result<String, String>) {
    match outcome {
        Ok(message) => println!("{}", message),
        Err(message) => eprintln!("Error: {}", message),
    }
}

fn execute(store: &Store, command: ShellCommand, interactive: bool) -> Result<Flow> {
    match command {
        ShellCommand::Status { json } => handle_status(store, json)?,
        ShellCommand::Jobs { query } => handle_jobs(store, &query.join(" "))?,
        ShellCommand::Show { job, json } => match resolve_job(store, &job) {
            Ok(job_id) => show_job(store, &job_id, json)?,
            Err(message) => eprintln!("Error: {}", message),
        },
        ShellCommand::Clock { action } => report(run_clock(store, action)),
        ShellCommand::Stage { subcommand } => report(run_stage(store, subcommand, interactive)),
        ShellCommand::Lock => {
            store.lock();
            println!("Controls locked.");
        }
        ShellCommand::Unlock => {
            store.unlock();
            println!("Controls unlocked.");
        }
        ShellCommand::Drawer { action } => match action {
            DrawerCommands::Open if store.is_locked() => eprintln!("Error: {}", StageError::Locked),
            DrawerCommands::Open => {
                store.set_drawer_open(true);
                print!("{}", format_status(&store.snapshot(), false));
            }
            DrawerCommands::Close => {
                store.set_drawer_open(false);
                println!("Drawer closed.");
            }
        },
        ShellCommand::Reset => {
            if !interactive || confirm("This discards every shift and stage record. Continue?")? {
                store.reset();
                println!("State reset. Controls locked.");
            } else {
                println!("Cancelled.");
            }
        }
        ShellCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// Run the interactive loop until `quit` or end of input
pub fn run_shell(store: Store) -> Result<()> {
    let _timers = Timers::start(&store);
    let stdin = std::io::stdin();
    let interactive = stdin.is_terminal();

    println!("Controls are locked. Type `unlock` to begin, `help` for commands.");

    loop {
        print!("{}", prompt(&store));
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            break;
        }

        let words: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if words.is_empty() {
            continue;
        }
        store.register_interaction();

        let words = match abbrev::expand_command_abbreviations(words, abbrev::SHELL_COMMANDS) {
            Ok(words) => words,
            Err(message) => {
                eprintln!("Error: {}", message);
                continue;
            }
        };
        let parsed = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed,
            Err(e) => {
                // Help output and usage errors alike
                let _ = e.print();
                continue;
            }
        };

        if let Flow::Quit = execute(&store, parsed.command, interactive)? {
            break;
        }
    }

    Ok(())
}
