//! CLI command implementations.

pub mod bookings;
pub mod report;
pub mod show_config;
pub mod util;
