//! Utilization tracker CLI library.
//!
//! This crate provides the CLI interface for the utilization tracker.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, ReportArgs, SourceArgs};
pub use config::Config;
