//! Operating hours and clipping of bookings against them.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::booking::Booking;

/// Invalid operating-hours configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An hour outside 0-23.
    #[error("{field} must be between 0 and 23, got {value}")]
    HourOutOfRange { field: &'static str, value: u32 },

    /// The window is empty or inverted.
    #[error("start_hour ({start_hour}) must be before end_hour ({end_hour})")]
    EmptyWindow { start_hour: u32, end_hour: u32 },
}

/// The daily `[start_hour, end_hour)` range during which usage counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct OperatingWindow {
    start_hour: u32,
    end_hour: u32,
}

#[derive(Deserialize)]
struct RawWindow {
    start_hour: u32,
    end_hour: u32,
}

impl TryFrom<RawWindow> for OperatingWindow {
    type Error = ConfigError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        Self::new(raw.start_hour, raw.end_hour)
    }
}

impl OperatingWindow {
    pub const DEFAULT_START_HOUR: u32 = 6;
    pub const DEFAULT_END_HOUR: u32 = 18;

    /// Creates a window after validation.
    pub const fn new(start_hour: u32, end_hour: u32) -> Result<Self, ConfigError> {
        if start_hour > 23 {
            return Err(ConfigError::HourOutOfRange {
                field: "start_hour",
                value: start_hour,
            });
        }
        if end_hour > 23 {
            return Err(ConfigError::HourOutOfRange {
                field: "end_hour",
                value: end_hour,
            });
        }
        if start_hour >= end_hour {
            return Err(ConfigError::EmptyWindow {
                start_hour,
                end_hour,
            });
        }
        Ok(Self {
            start_hour,
            end_hour,
        })
    }

    pub const fn start_hour(self) -> u32 {
        self.start_hour
    }

    pub const fn end_hour(self) -> u32 {
        self.end_hour
    }

    /// Hours available per day; the utilization denominator.
    pub fn available_hours(self) -> f64 {
        f64::from(self.end_hour - self.start_hour)
    }
}

impl Default for OperatingWindow {
    fn default() -> Self {
        Self {
            start_hour: Self::DEFAULT_START_HOUR,
            end_hour: Self::DEFAULT_END_HOUR,
        }
    }
}

/// Hours of `booking` that fall inside the operating window.
///
/// Bookings starting at midnight count as the full operating day. Otherwise
/// the start is pushed forward to opening time on the start's date and the
/// end pulled back to closing time on the end's date. The result is never
/// negative.
pub fn hours_in_operating_window(booking: &Booking, window: OperatingWindow) -> f64 {
    if booking.is_all_day() {
        return window.available_hours();
    }

    let start = booking.start();
    let end = booking.end();
    let open = same_day_at(start, window.start_hour).unwrap_or(start);
    let close = same_day_at(end, window.end_hour).unwrap_or(end);

    let effective_start = start.max(open);
    let effective_end = end.min(close);

    hours(effective_end - effective_start).max(0.0)
}

/// `ts` with its time of day replaced by `hour:00`, in the same offset.
fn same_day_at(ts: DateTime<FixedOffset>, hour: u32) -> Option<DateTime<FixedOffset>> {
    let time = NaiveTime::from_hms_opt(hour, 0, 0)?;
    ts.date_naive()
        .and_time(time)
        .and_local_timezone(*ts.offset())
        .single()
}

#[allow(clippy::cast_precision_loss)]
pub fn hours(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 3_600_000.0
}
