//! Bookings command for inspecting normalized calendar data.
//!
//! This module outputs the bookings a report would use as JSONL for debugging.

use std::io::Write;

use anyhow::Result;
use ut_core::normalize_events;

use crate::Config;
use crate::cli::SourceArgs;
use crate::commands::util;

/// Runs the bookings command, writing one JSON booking per line.
pub fn run<W: Write>(writer: &mut W, args: &SourceArgs, config: &Config) -> Result<()> {
    let window = util::report_window(args.date);
    let events = util::load_events(config, &window, args.events_file.as_deref())?;
    let bookings = normalize_events(&events, util::local_offset(window.start));

    tracing::debug!(
        events = events.len(),
        bookings = bookings.len(),
        "bookings normalized"
    );

    for booking in &bookings {
        let json = serde_json::to_string(booking)?;
        writeln!(writer, "{json}")?;
    }

    Ok(())
}
