//! Shopclock - a shop-floor stage and shift clock
//!
//! Tracks repair jobs through ten fixed work stages. This library provides:
//! - Data models for stages, shifts, owners and the job roster
//! - The stage, shift, session and tick engines (pure state transitions)
//! - Ghost-worker seeding for a populated demo shop
//! - A versioned store with SQLite persistence and background timers
//! - CLI command parsing, output and an interactive shell
//!
//! # Example
//!
//! ```no_run
//! use shopclock::cli::run;
//!
//! fn main() {
//!     if let Err(e) = run() {
//!         eprintln!("Error: {}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

pub mod cli;
pub mod config;
pub mod db;
pub mod driver;
pub mod engine;
pub mod models;
pub mod repo;
pub mod store;
pub mod utils;
