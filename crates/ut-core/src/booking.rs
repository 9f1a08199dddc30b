//! Calendar events and the bookings normalized from them.

use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Title used when an event carries no summary.
pub const UNTITLED: &str = "(No title)";

/// Start or end marker of a calendar event.
///
/// All-day events carry only `date` (`YYYY-MM-DD`); timed events carry
/// `date_time` (RFC 3339). Field names follow the Google Calendar wire format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
}

impl EventTime {
    /// A timed marker.
    pub fn at(date_time: impl Into<String>) -> Self {
        Self {
            date: None,
            date_time: Some(date_time.into()),
        }
    }

    /// A date-only (all-day) marker.
    pub fn on(date: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
            date_time: None,
        }
    }
}

/// A raw event record as delivered by the calendar source.
///
/// Unknown fields are ignored so full provider payloads deserialize as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<EventTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<EventTime>,
}

/// Which end of an event a marker belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Start,
    End,
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::End => f.write_str("end"),
        }
    }
}

/// Reasons an event record cannot become a booking.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedEvent {
    /// The record has no start or end marker.
    #[error("event has no {0} marker")]
    Missing(Marker),

    /// The marker has neither a timestamp nor a date.
    #[error("{0} marker is empty")]
    Empty(Marker),

    /// The timestamp is not valid RFC 3339.
    #[error("invalid {marker} timestamp {value:?}")]
    InvalidTimestamp { marker: Marker, value: String },

    /// The date is not `YYYY-MM-DD`.
    #[error("invalid {marker} date {value:?}")]
    InvalidDate { marker: Marker, value: String },
}

/// A single reservation of the facility.
///
/// Timestamps keep the offset they were delivered with, so the hour of day
/// and the calendar day are those the calendar showed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Booking {
    title: String,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    #[serde(rename = "duration_ms", serialize_with = "serialize_duration_ms")]
    duration: Duration,
}

impl Booking {
    /// Creates a booking. `end` before `start` is accepted and yields a
    /// negative duration.
    pub fn new(
        title: impl Into<String>,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            UNTITLED.to_string()
        } else {
            title
        };
        Self {
            title,
            start,
            end,
            duration: end - start,
        }
    }

    /// Builds a booking from a raw event.
    ///
    /// Date-only markers resolve to midnight in `all_day_offset`.
    pub fn from_event(
        event: &RawEvent,
        all_day_offset: FixedOffset,
    ) -> Result<Self, MalformedEvent> {
        let start = event
            .start
            .as_ref()
            .ok_or(MalformedEvent::Missing(Marker::Start))?;
        let end = event
            .end
            .as_ref()
            .ok_or(MalformedEvent::Missing(Marker::End))?;

        let start = parse_marker(start, Marker::Start, all_day_offset)?;
        let end = parse_marker(end, Marker::End, all_day_offset)?;

        let title = event.summary.clone().unwrap_or_default();
        Ok(Self::new(title, start, end))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub const fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    pub const fn end(&self) -> DateTime<FixedOffset> {
        self.end
    }

    /// `end - start`, fixed at construction.
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Calendar day the booking is attributed to (its start date).
    pub fn date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Whether the booking starts exactly at midnight.
    ///
    /// Date-only events always do, and so does any timed event that starts
    /// at 00:00; both consume the whole operating day.
    pub fn is_all_day(&self) -> bool {
        self.start.hour() == 0 && self.start.minute() == 0
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_duration_ms<S: Serializer>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(duration.num_milliseconds())
}

fn parse_marker(
    marker_time: &EventTime,
    marker: Marker,
    all_day_offset: FixedOffset,
) -> Result<DateTime<FixedOffset>, MalformedEvent> {
    if let Some(value) = marker_time.date_time.as_deref().filter(|v| !v.is_empty()) {
        let invalid = MalformedEvent::InvalidTimestamp {
            marker,
            value: value.to_string(),
        };
        return DateTime::parse_from_rfc3339(value).map_err(|_| invalid);
    }

    let value = marker_time
        .date
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(MalformedEvent::Empty(marker))?;
    let invalid = || MalformedEvent::InvalidDate {
        marker,
        value: value.to_string(),
    };
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())?;
    let midnight = date.and_time(NaiveTime::MIN);
    midnight
        .and_local_timezone(all_day_offset)
        .single()
        .ok_or_else(invalid)
}

/// Converts raw events into bookings, dropping malformed records.
///
/// Input order is preserved; nothing is re-sorted.
pub fn normalize_events(events: &[RawEvent], all_day_offset: FixedOffset) -> Vec<Booking> {
    events
        .iter()
        .enumerate()
        .filter_map(|(index, event)| match Booking::from_event(event, all_day_offset) {
            Ok(booking) => Some(booking),
            Err(err) => {
                tracing::debug!(index, error = %err, "skipping malformed event");
                None
            }
        })
        .collect()
}
