//! Line-oriented shell over the wizards, store, and review back-office.

pub mod commands;
pub mod core;
pub mod help;
pub mod interaction;
pub mod io;
pub mod output;
mod shell;

pub use core::{CliError, CliMode, ShellContext};
pub use shell::run_cli;
