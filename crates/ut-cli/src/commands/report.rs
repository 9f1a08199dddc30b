//! Report command for facility utilization.
//!
//! This module implements `ut report` with an optional start date and output
//! formats (human-readable, JSON).

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::Serialize;
use ut_core::{
    Booking, DayStats, OperatingWindow, RawEvent, ReportWindow, Statistics, Summary,
    UtilizationConfig, UtilizationLevel, WeekStats, compute_statistics, normalize_events,
};

use crate::Config;
use crate::cli::ReportArgs;
use crate::commands::util;

/// Computed report data.
#[derive(Debug)]
pub struct ReportData {
    pub generated_at: DateTime<Utc>,
    pub window: ReportWindow,
    /// Offset used to display the window and resolve all-day events.
    pub offset: FixedOffset,
    pub timezone: String,
    pub calendar_id: String,
    pub utilization: UtilizationConfig,
    pub operating: OperatingWindow,
    pub statistics: Statistics,
    pub summary: Summary,
}

// ========== Report Generation ==========

/// Normalizes `events` and aggregates them with the configured settings.
pub fn generate_report_data(
    events: &[RawEvent],
    window: ReportWindow,
    config: &Config,
    offset: FixedOffset,
    generated_at: DateTime<Utc>,
) -> Result<ReportData> {
    let utilization = config.utilization.normalized();
    let operating = utilization
        .operating_window()
        .context("invalid utilization config")?;

    let bookings = normalize_events(events, offset);
    tracing::info!(
        events = events.len(),
        bookings = bookings.len(),
        "bookings parsed"
    );

    let statistics = compute_statistics(bookings, operating, utilization.stats_options());
    let summary = Summary::from_stats(&statistics.bookings, &statistics.daily);
    let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());

    Ok(ReportData {
        generated_at,
        window,
        offset,
        timezone,
        calendar_id: config.calendar_id.clone(),
        utilization,
        operating,
        statistics,
        summary,
    })
}

impl ReportData {
    fn first_day(&self) -> NaiveDate {
        self.window.start.with_timezone(&self.offset).date_naive()
    }

    /// Last day touched by the half-open window.
    fn last_day(&self) -> NaiveDate {
        (self.window.end - Duration::seconds(1))
            .with_timezone(&self.offset)
            .date_naive()
    }

    fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }
}

// ========== Formatting Helpers ==========

/// Formats milliseconds as duration string.
/// Returns "Xh Ym" if >= 1 hour, "Xm" if < 1 hour.
/// Negative durations are treated as 0m.
pub fn format_duration(ms: i64) -> String {
    if ms < 0 {
        return "0m".to_string();
    }
    let total_minutes = ms / 60_000;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Start of a booking as the calendar shows it.
pub fn format_booking_time(booking: &Booking) -> String {
    if booking.is_all_day() {
        booking.start().format("%a %b %-d (all day)").to_string()
    } else {
        booking.start().format("%a %b %-d %H:%M").to_string()
    }
}

/// Generates a 10-character utilization bar.
/// Non-zero values under 5% get a single block; values over 100% fill the bar.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn utilization_bar(percent: f64) -> String {
    let ratio = percent.max(0.0) / 100.0;
    let filled = if ratio > 0.0 && ratio < 0.05 {
        1
    } else {
        (ratio * 10.0).round().min(10.0) as usize
    };

    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

fn stats_line(label: &str, width: usize, total_hours: f64, utilization: f64) -> String {
    let hours = format!("{total_hours:.1}h");
    let percent = format!("{utilization:.1}%");
    let bar = utilization_bar(utilization);
    let level = UtilizationLevel::of(utilization).as_str();
    format!("{label:<width$}{hours:>7}  {percent:>7}  {bar}  {level}")
}

fn day_line(day: &DayStats) -> String {
    let label = day.date.format("%a %b %-d").to_string();
    stats_line(&label, 12, day.total_hours, day.utilization)
}

fn week_line(week: &WeekStats) -> String {
    let label = format!(
        "{} - {}",
        week.week_start.format("%b %-d"),
        week.week_end.format("%b %-d")
    );
    stats_line(&label, 16, week.total_hours, week.utilization)
}

// ========== Human Output ==========

/// Formats the human-readable report output.
pub fn format_report(data: &ReportData) -> String {
    let mut output = String::new();

    // Header
    writeln!(
        output,
        "UTILIZATION REPORT: {} to {}",
        data.first_day().format("%a %b %-d, %Y"),
        data.last_day().format("%a %b %-d, %Y")
    )
    .unwrap();
    writeln!(output, "Calendar: {}", data.calendar_id).unwrap();
    writeln!(
        output,
        "Operating hours: {:02}:00-{:02}:00 ({}h per day)",
        data.operating.start_hour(),
        data.operating.end_hour(),
        data.operating.end_hour() - data.operating.start_hour()
    )
    .unwrap();
    writeln!(
        output,
        "Previous: {}  Next: {}",
        data.day_of(data.window.previous().start).format("%Y-%m-%d"),
        data.day_of(data.window.next().start).format("%Y-%m-%d")
    )
    .unwrap();

    let stats = &data.statistics;
    if stats.bookings.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "No bookings in this period.").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Hint: Run 'ut config' to check the calendar id.").unwrap();
        return output;
    }

    // SUMMARY section
    writeln!(output).unwrap();
    writeln!(output, "SUMMARY").unwrap();
    writeln!(output, "───────").unwrap();
    let summary = &data.summary;
    writeln!(output, "{:<18}{}", "Bookings:", summary.total_bookings).unwrap();
    if data.utilization.show_daily_stats {
        writeln!(output, "{:<18}{:.1}", "Booked hours:", summary.total_hours).unwrap();
        writeln!(
            output,
            "{:<18}{:.1}%",
            "Avg utilization:", summary.average_utilization
        )
        .unwrap();
    }

    // DAILY section
    if data.utilization.show_daily_stats {
        writeln!(output).unwrap();
        writeln!(output, "DAILY").unwrap();
        writeln!(output, "─────").unwrap();
        for day in &stats.daily {
            writeln!(output, "{}", day_line(day)).unwrap();
        }
    }

    // WEEKLY section
    if data.utilization.show_weekly_stats {
        writeln!(output).unwrap();
        writeln!(output, "WEEKLY").unwrap();
        writeln!(output, "──────").unwrap();
        for week in &stats.weekly {
            writeln!(output, "{}", week_line(week)).unwrap();
        }
    }

    // BOOKINGS section
    writeln!(output).unwrap();
    writeln!(output, "BOOKINGS").unwrap();
    writeln!(output, "────────").unwrap();
    for booking in &stats.bookings {
        writeln!(
            output,
            "{:<22}{} ({})",
            format_booking_time(booking),
            booking.title(),
            format_duration(booking.duration().num_milliseconds())
        )
        .unwrap();
    }

    output
}

// ========== JSON Output ==========

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub generated_at: String,
    pub timezone: &'a str,
    pub calendar_id: &'a str,
    pub period: JsonPeriod,
    pub operating_hours: OperatingWindow,
    pub summary: Summary,
    pub bookings: &'a [Booking],
    pub daily: Vec<JsonDay<'a>>,
    pub weekly: Vec<JsonWeek<'a>>,
}

#[derive(Debug, Serialize)]
pub struct JsonPeriod {
    pub start: String,
    pub end: String,
    pub previous: String,
    pub next: String,
}

#[derive(Debug, Serialize)]
pub struct JsonDay<'a> {
    #[serde(flatten)]
    pub stats: &'a DayStats,
    pub level: UtilizationLevel,
}

#[derive(Debug, Serialize)]
pub struct JsonWeek<'a> {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub total_hours: f64,
    pub utilization: f64,
    pub level: UtilizationLevel,
    pub days: Vec<JsonDay<'a>>,
}

fn json_day(stats: &DayStats) -> JsonDay<'_> {
    JsonDay {
        stats,
        level: UtilizationLevel::of(stats.utilization),
    }
}

/// Formats report data as JSON.
pub fn format_report_json(data: &ReportData) -> Result<String> {
    let ymd = |d: NaiveDate| d.format("%Y-%m-%d").to_string();
    let stats = &data.statistics;

    let report = JsonReport {
        generated_at: data.generated_at.to_rfc3339(),
        timezone: &data.timezone,
        calendar_id: &data.calendar_id,
        period: JsonPeriod {
            start: ymd(data.first_day()),
            end: ymd(data.last_day()),
            previous: ymd(data.day_of(data.window.previous().start)),
            next: ymd(data.day_of(data.window.next().start)),
        },
        operating_hours: data.operating,
        summary: data.summary,
        bookings: &stats.bookings,
        daily: stats.daily.iter().map(json_day).collect(),
        weekly: stats
            .weekly
            .iter()
            .map(|week| JsonWeek {
                week_start: week.week_start,
                week_end: week.week_end,
                total_hours: week.total_hours,
                utilization: week.utilization,
                level: UtilizationLevel::of(week.utilization),
                days: week.days.iter().map(json_day).collect(),
            })
            .collect(),
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

// ========== Public Interface ==========

/// Runs the report command.
pub fn run<W: Write>(writer: &mut W, args: &ReportArgs, config: &Config) -> Result<()> {
    let window = util::report_window(args.source.date);
    let events = util::load_events(config, &window, args.source.events_file.as_deref())?;
    let offset = util::local_offset(window.start);
    let data = generate_report_data(&events, window, config, offset, Utc::now())?;

    if args.json {
        writeln!(writer, "{}", format_report_json(&data)?)?;
    } else {
        write!(writer, "{}", format_report(&data))?;
    }

    Ok(())
}
