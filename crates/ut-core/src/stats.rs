//! Daily and weekly utilization aggregation.
//!
//! Each booking is attributed entirely to the day (and week) on which it
//! starts. Clipped hours of overlapping bookings are summed independently,
//! so utilization can exceed 100% when a slot is double-booked.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::booking::Booking;
use crate::window::{OperatingWindow, hours_in_operating_window};

/// Days per week used as the weekly utilization denominator.
const DAYS_PER_WEEK: f64 = 7.0;

/// Utilization of a single calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayStats {
    pub date: NaiveDate,
    /// Bookings starting on this day, in input order.
    pub bookings: Vec<Booking>,
    pub total_hours: f64,
    /// Percentage of available hours; not capped at 100.
    pub utilization: f64,
}

/// Utilization of a Monday-to-Sunday week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekStats {
    /// Always a Monday.
    pub week_start: NaiveDate,
    /// `week_start` + 6 days.
    pub week_end: NaiveDate,
    pub total_hours: f64,
    /// Percentage of seven full operating days.
    pub utilization: f64,
    /// Days of the week that had at least one booking, chronological.
    pub days: Vec<DayStats>,
}

/// Which aggregation levels to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsOptions {
    pub daily: bool,
    pub weekly: bool,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            daily: true,
            weekly: true,
        }
    }
}

/// Everything computed for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub bookings: Vec<Booking>,
    pub daily: Vec<DayStats>,
    pub weekly: Vec<WeekStats>,
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let days_since_monday = date.weekday().num_days_from_monday();
    date - Duration::days(i64::from(days_since_monday))
}

/// Groups bookings by start date and computes per-day utilization.
///
/// Days are returned in chronological order; days without bookings are
/// omitted.
pub fn daily_stats(bookings: &[Booking], window: OperatingWindow) -> Vec<DayStats> {
    let mut by_day: BTreeMap<NaiveDate, Vec<Booking>> = BTreeMap::new();
    for booking in bookings {
        by_day
            .entry(booking.date())
            .or_default()
            .push(booking.clone());
    }

    by_day
        .into_iter()
        .map(|(date, bookings)| {
            let total_hours = bookings
                .iter()
                .map(|booking| hours_in_operating_window(booking, window))
                .sum();
            DayStats {
                date,
                bookings,
                total_hours,
                utilization: percent(total_hours, window.available_hours()),
            }
        })
        .collect()
}

/// Groups bookings by Monday-start week and computes per-week utilization.
///
/// Weeks are returned in chronological order.
pub fn weekly_stats(bookings: &[Booking], window: OperatingWindow) -> Vec<WeekStats> {
    let mut by_week: BTreeMap<NaiveDate, Vec<Booking>> = BTreeMap::new();
    for booking in bookings {
        by_week
            .entry(week_start(booking.date()))
            .or_default()
            .push(booking.clone());
    }

    by_week
        .into_iter()
        .map(|(week_start, bookings)| {
            let days = daily_stats(&bookings, window);
            let total_hours = days.iter().map(|day| day.total_hours).sum();
            WeekStats {
                week_start,
                week_end: week_start + Duration::days(6),
                total_hours,
                utilization: percent(total_hours, DAYS_PER_WEEK * window.available_hours()),
                days,
            }
        })
        .collect()
}

/// Runs the enabled aggregation levels over `bookings`.
///
/// A disabled level yields an empty list.
pub fn compute_statistics(
    bookings: Vec<Booking>,
    window: OperatingWindow,
    options: StatsOptions,
) -> Statistics {
    let daily = if options.daily {
        let daily = daily_stats(&bookings, window);
        tracing::info!(count = daily.len(), "daily stats calculated");
        daily
    } else {
        Vec::new()
    };

    let weekly = if options.weekly {
        let weekly = weekly_stats(&bookings, window);
        tracing::info!(count = weekly.len(), "weekly stats calculated");
        weekly
    } else {
        Vec::new()
    };

    Statistics {
        bookings,
        daily,
        weekly,
    }
}

fn percent(hours: f64, available: f64) -> f64 {
    hours / available * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset};

    use crate::window::hours;

    fn ts(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn booking(title: &str, start: &str, end: &str) -> Booking {
        Booking::new(title, ts(start), ts(end))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// Mon 27 Jan 2025: 08-10; Tue 28 Jan: all day.
    fn example_week() -> Vec<Booking> {
        vec![
            booking("Lesson", "2025-01-27T08:00:00Z", "2025-01-27T10:00:00Z"),
            booking("Cup", "2025-01-28T00:00:00Z", "2025-01-29T00:00:00Z"),
        ]
    }

    // ========== Week Boundary Tests ==========

    #[test]
    fn test_week_start_on_monday_is_same_day() {
        assert_eq!(week_start(date(2025, 1, 27)), date(2025, 1, 27));
    }

    #[test]
    fn test_week_start_on_sunday_goes_back_six_days() {
        assert_eq!(week_start(date(2025, 2, 2)), date(2025, 1, 27));
    }

    #[test]
    fn test_week_start_midweek_and_across_year() {
        assert_eq!(week_start(date(2025, 1, 29)), date(2025, 1, 27));
        // Thu 1 Jan 2026 belongs to the week starting Mon 29 Dec 2025.
        assert_eq!(week_start(date(2026, 1, 1)), date(2025, 12, 29));
    }

    // ========== Daily Aggregation Tests ==========

    #[test]
    fn test_daily_stats_example() {
        let window = OperatingWindow::default();
        let days = daily_stats(&example_week(), window);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, date(2025, 1, 27));
        assert!(approx(days[0].total_hours, 2.0));
        assert!(approx(days[0].utilization, 2.0 / 12.0 * 100.0));
        assert_eq!(days[1].date, date(2025, 1, 28));
        assert!(approx(days[1].total_hours, 12.0));
        assert!(approx(days[1].utilization, 100.0));
    }

    #[test]
    fn test_daily_stats_clips_to_full_day() {
        let window = OperatingWindow::default();
        let camp = booking("Camp", "2025-01-27T05:00:00Z", "2025-01-27T19:00:00Z");
        let days = daily_stats(&[camp], window);
        assert!(approx(days[0].total_hours, 12.0));
        assert!(approx(days[0].utilization, 100.0));
    }

    #[test]
    fn test_daily_stats_attributes_by_start_date() {
        let window = OperatingWindow::default();
        let late = booking("Late", "2025-01-27T17:00:00Z", "2025-01-28T09:00:00Z");
        let days = daily_stats(&[late], window);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, date(2025, 1, 27));
    }

    #[test]
    fn test_daily_stats_overlaps_exceed_hundred_percent() {
        let window = OperatingWindow::default();
        let bookings = vec![
            booking("A", "2025-01-27T06:00:00Z", "2025-01-27T18:00:00Z"),
            booking("B", "2025-01-27T12:00:00Z", "2025-01-27T18:00:00Z"),
        ];
        let days = daily_stats(&bookings, window);
        assert!(approx(days[0].total_hours, 18.0));
        assert!(approx(days[0].utilization, 150.0));
    }

    #[test]
    fn test_daily_stats_sorted_and_keeps_booking_order() {
        let window = OperatingWindow::default();
        let bookings = vec![
            booking("third", "2025-01-30T08:00:00Z", "2025-01-30T09:00:00Z"),
            booking("first-b", "2025-01-27T12:00:00Z", "2025-01-27T13:00:00Z"),
            booking("first-a", "2025-01-27T08:00:00Z", "2025-01-27T09:00:00Z"),
        ];
        let days = daily_stats(&bookings, window);

        let dates: Vec<_> = days.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![date(2025, 1, 27), date(2025, 1, 30)]);
        let titles: Vec<_> = days[0].bookings.iter().map(Booking::title).collect();
        assert_eq!(titles, vec!["first-b", "first-a"]);
    }

    #[test]
    fn test_daily_totals_equal_sum_of_clipped_hours() {
        let window = OperatingWindow::new(7, 21).unwrap();
        let bookings = vec![
            booking("a", "2025-01-27T05:00:00Z", "2025-01-27T08:30:00Z"),
            booking("b", "2025-01-27T20:00:00Z", "2025-01-27T23:00:00Z"),
            booking("c", "2025-01-29T00:00:00Z", "2025-01-30T00:00:00Z"),
            booking(
                "d",
                "2025-02-03T10:00:00+05:00",
                "2025-02-03T12:15:00+05:00",
            ),
            booking("e", "2025-02-04T13:00:00Z", "2025-02-04T12:00:00Z"),
        ];

        let from_days: f64 = daily_stats(&bookings, window)
            .iter()
            .map(|d| d.total_hours)
            .sum();
        let from_bookings: f64 = bookings
            .iter()
            .map(|b| hours_in_operating_window(b, window))
            .sum();
        assert!(approx(from_days, from_bookings));
    }

    #[test]
    fn test_daily_stats_empty() {
        assert!(daily_stats(&[], OperatingWindow::default()).is_empty());
    }

    // ========== Weekly Aggregation Tests ==========

    #[test]
    fn test_weekly_stats_example() {
        let window = OperatingWindow::default();
        let weeks = weekly_stats(&example_week(), window);

        assert_eq!(weeks.len(), 1);
        let week = &weeks[0];
        assert_eq!(week.week_start, date(2025, 1, 27));
        assert_eq!(week.week_end, date(2025, 2, 2));
        assert!(approx(week.total_hours, 14.0));
        assert!(approx(week.utilization, 14.0 / 84.0 * 100.0));
        assert_eq!(week.days.len(), 2);
    }

    #[test]
    fn test_weekly_stats_sunday_joins_previous_monday() {
        let window = OperatingWindow::default();
        let bookings = vec![
            booking("mon", "2025-01-27T08:00:00Z", "2025-01-27T09:00:00Z"),
            booking("sun", "2025-02-02T08:00:00Z", "2025-02-02T09:00:00Z"),
            booking("next-mon", "2025-02-03T08:00:00Z", "2025-02-03T09:00:00Z"),
        ];
        let weeks = weekly_stats(&bookings, window);

        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].week_start, date(2025, 1, 27));
        assert_eq!(weeks[0].days.len(), 2);
        assert_eq!(weeks[1].week_start, date(2025, 2, 3));
        assert_eq!(weeks[1].week_end, date(2025, 2, 9));
    }

    #[test]
    fn test_weekly_total_equals_sum_of_days() {
        let window = OperatingWindow::default();
        let bookings = vec![
            booking("a", "2025-01-27T05:00:00Z", "2025-01-27T08:30:00Z"),
            booking("b", "2025-01-28T09:00:00Z", "2025-01-28T11:45:00Z"),
            booking("c", "2025-02-05T00:00:00Z", "2025-02-06T00:00:00Z"),
            booking("d", "2025-02-07T16:00:00Z", "2025-02-07T20:00:00Z"),
        ];
        for week in weekly_stats(&bookings, window) {
            let from_days: f64 = week.days.iter().map(|d| d.total_hours).sum();
            assert!(approx(week.total_hours, from_days));
            let in_week = |d: &DayStats| d.date >= week.week_start && d.date <= week.week_end;
            assert!(week.days.iter().all(in_week));
        }
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let window = OperatingWindow::default();
        let bookings = example_week();
        assert_eq!(
            daily_stats(&bookings, window),
            daily_stats(&bookings, window)
        );
        assert_eq!(
            weekly_stats(&bookings, window),
            weekly_stats(&bookings, window)
        );
        assert_eq!(bookings, example_week());
    }

    // ========== Engine Tests ==========

    #[test]
    fn test_compute_statistics_respects_options() {
        let window = OperatingWindow::default();
        let stats = compute_statistics(
            example_week(),
            window,
            StatsOptions {
                daily: true,
                weekly: false,
            },
        );
        assert_eq!(stats.bookings.len(), 2);
        assert_eq!(stats.daily.len(), 2);
        assert!(stats.weekly.is_empty());

        let stats = compute_statistics(
            example_week(),
            window,
            StatsOptions {
                daily: false,
                weekly: true,
            },
        );
        assert!(stats.daily.is_empty());
        assert_eq!(stats.weekly.len(), 1);
    }

    #[test]
    fn test_inside_window_hours_equal_duration() {
        let window = OperatingWindow::default();
        let b = booking("x", "2025-01-27T10:20:00Z", "2025-01-27T16:05:00Z");
        assert!(approx(
            hours_in_operating_window(&b, window),
            hours(b.duration())
        ));
    }
}
