//! Reporting window selection.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

/// Length of the fetch window, counted forward from the reference instant.
const FETCH_WINDOW_DAYS: i64 = 30;

/// Step used by previous/next navigation.
const NAVIGATION_STEP_DAYS: i64 = 7;

/// Half-open `[start, end)` range of instants the booking source is queried for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    /// Thirty-day window starting at `reference`.
    pub fn starting_at(reference: DateTime<Utc>) -> Self {
        Self {
            start: reference,
            end: reference + Duration::days(FETCH_WINDOW_DAYS),
        }
    }

    /// Window starting at local midnight of `date`.
    pub fn for_date(date: NaiveDate) -> Self {
        Self::starting_at(local_midnight_to_utc(date))
    }

    /// Window starting now.
    pub fn now() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Same window shifted one week earlier.
    #[must_use]
    pub fn previous(self) -> Self {
        self.shifted(-NAVIGATION_STEP_DAYS)
    }

    /// Same window shifted one week later.
    #[must_use]
    pub fn next(self) -> Self {
        self.shifted(NAVIGATION_STEP_DAYS)
    }

    fn shifted(self, days: i64) -> Self {
        Self {
            start: self.start + Duration::days(days),
            end: self.end + Duration::days(days),
        }
    }
}

/// Converts a local date at midnight to UTC.
/// Handles DST ambiguity by picking the earlier time.
fn local_midnight_to_utc(local_date: NaiveDate) -> DateTime<Utc> {
    let midnight = local_date.and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&midnight) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            // Spring-forward gap at midnight; 01:00 local exists.
            let one_am = midnight + Duration::hours(1);
            Local
                .from_local_datetime(&one_am)
                .earliest()
                .map_or_else(|| midnight.and_utc(), |dt| dt.with_timezone(&Utc))
        }
    }
}
