//! Core domain logic for the utilization tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Normalization: turning raw calendar events into bookings
//! - Clipping: counting only the hours inside the operating window
//! - Aggregation: daily and weekly utilization statistics
//! - Period selection: the window of bookings a report covers

mod booking;
mod config;
mod period;
mod stats;
mod summary;
mod window;

pub use booking::{
    Booking, EventTime, MalformedEvent, Marker, RawEvent, UNTITLED, normalize_events,
};
pub use config::UtilizationConfig;
pub use period::ReportWindow;
pub use stats::{
    DayStats, Statistics, StatsOptions, WeekStats, compute_statistics, daily_stats, week_start,
    weekly_stats,
};
pub use summary::{Summary, UtilizationLevel};
pub use window::{ConfigError, OperatingWindow, hours_in_operating_window};
