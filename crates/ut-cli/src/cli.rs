//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Facility utilization tracker.
///
/// Reads bookings from a calendar, clips them to operating hours and reports
/// daily and weekly utilization.
#[derive(Debug, Parser)]
#[command(name = "ut", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show utilization for the 30 days starting at a date.
    Report(ReportArgs),

    /// Print normalized bookings as JSON lines.
    Bookings(SourceArgs),

    /// Print the resolved configuration.
    Config,
}

/// Where bookings come from and which period they cover.
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// First day of the report (YYYY-MM-DD). Defaults to now.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Read events from a JSON file instead of the calendar.
    ///
    /// Accepts an array of events or a calendar list response with `items`.
    #[arg(long, value_name = "PATH")]
    pub events_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}
