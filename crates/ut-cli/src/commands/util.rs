//! Shared utilities for CLI commands.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, Utc};
use serde::Deserialize;
use ut_core::{RawEvent, ReportWindow};
use ut_gcal::{Client, ErrorKind, FetchError};

use crate::Config;

/// Report window for an optional `--date`, defaulting to now.
pub fn report_window(date: Option<NaiveDate>) -> ReportWindow {
    date.map_or_else(ReportWindow::now, ReportWindow::for_date)
}

/// Local UTC offset in effect at `at`; all-day events resolve to midnight in it.
pub fn local_offset(at: DateTime<Utc>) -> FixedOffset {
    at.with_timezone(&Local).offset().fix()
}

/// Loads raw events from `events_file` if given, otherwise from the calendar.
pub fn load_events(
    config: &Config,
    window: &ReportWindow,
    events_file: Option<&Path>,
) -> Result<Vec<RawEvent>> {
    events_file.map_or_else(|| fetch_events(config, window), read_events_file)
}

/// Reads events from a JSON file holding either an array of events or a
/// calendar list response.
pub fn read_events_file(path: &Path) -> Result<Vec<RawEvent>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum EventsFile {
        Events(Vec<RawEvent>),
        Page { items: Vec<RawEvent> },
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let parsed: EventsFile = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse events in {}", path.display()))?;
    let events = match parsed {
        EventsFile::Events(events) | EventsFile::Page { items: events } => events,
    };
    tracing::info!(count = events.len(), path = %path.display(), "events loaded from file");
    Ok(events)
}

fn fetch_events(config: &Config, window: &ReportWindow) -> Result<Vec<RawEvent>> {
    tracing::info!(
        calendar_id = %config.calendar_id,
        start = %window.start,
        end = %window.end,
        "starting calendar data retrieval"
    );

    let client = Client::from_files(
        &config.credentials_path,
        &config.token_path,
        config.fetch_timeout(),
    )
    .map_err(fetch_failure)?;
    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    runtime
        .block_on(client.list_events(&config.calendar_id, window))
        .map_err(fetch_failure)
}

/// Wraps a fetch error with a hint matching its cause.
fn fetch_failure(err: FetchError) -> anyhow::Error {
    tracing::error!(error = %err, "failed to get calendar data");
    let hint = match err.kind() {
        ErrorKind::Auth => "check credentials.json and token.json; 'ut config' shows their paths",
        ErrorKind::Unreachable => "check network connectivity",
        ErrorKind::Timeout => "the calendar API did not answer in time",
        ErrorKind::Other => "the calendar API may be rate limiting requests",
    };
    anyhow::Error::new(err).context(format!("unable to load calendar data ({hint})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_events_file_accepts_array_and_list_response() {
        let temp = tempfile::tempdir().unwrap();

        let array = temp.path().join("array.json");
        std::fs::write(
            &array,
            r#"[{"summary": "A", "start": {"date": "2025-01-27"}, "end": {"date": "2025-01-28"}}]"#,
        )
        .unwrap();
        let events = read_events_file(&array).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary.as_deref(), Some("A"));

        let page = temp.path().join("page.json");
        std::fs::write(
            &page,
            r#"{"kind": "calendar#events", "items": [{"summary": "B"}, {"summary": "C"}]}"#,
        )
        .unwrap();
        let events = read_events_file(&page).unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn read_events_file_reports_path_on_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = read_events_file(&path).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn missing_credentials_fail_before_any_request() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            credentials_path: temp.path().join("credentials.json"),
            token_path: temp.path().join("token.json"),
            ..Config::default()
        };
        let window = report_window(NaiveDate::from_ymd_opt(2025, 1, 27));

        let err = load_events(&config, &window, None).unwrap_err();
        assert!(err.to_string().contains("credentials.json"));
        let source = err.downcast_ref::<FetchError>().unwrap();
        assert_eq!(source.kind(), ErrorKind::Auth);
    }

    #[test]
    fn report_window_for_date_spans_thirty_days() {
        let window = report_window(NaiveDate::from_ymd_opt(2025, 1, 27));
        assert_eq!(window.end - window.start, chrono::Duration::days(30));
    }
}
