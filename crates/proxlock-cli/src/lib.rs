//! # proxlock-cli
//!
//! Command-line front end for proxlock.
//!
//! This library provides argument parsing, logging setup, signal handling,
//! interactive prompts, and the subcommand handlers used by the `proxlock`
//! binary.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod cli;
pub mod commands;
pub mod context;
pub mod logging;
pub mod prompt;
pub mod signals;
