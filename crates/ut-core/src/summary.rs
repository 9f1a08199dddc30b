//! Headline figures for a report.

use serde::Serialize;

use crate::booking::Booking;
use crate::stats::DayStats;

/// Totals shown above the detailed tables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub total_bookings: usize,
    /// Sum of daily clipped hours.
    pub total_hours: f64,
    /// Mean of daily utilization over days with bookings; 0 with no days.
    pub average_utilization: f64,
}

impl Summary {
    #[allow(clippy::cast_precision_loss)]
    pub fn from_stats(bookings: &[Booking], daily: &[DayStats]) -> Self {
        let total_hours = daily.iter().map(|day| day.total_hours).sum();
        let average_utilization = if daily.is_empty() {
            0.0
        } else {
            daily.iter().map(|day| day.utilization).sum::<f64>() / daily.len() as f64
        };

        Self {
            total_bookings: bookings.len(),
            total_hours,
            average_utilization,
        }
    }
}

/// Coarse utilization band used to highlight busy days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UtilizationLevel {
    Low,
    Medium,
    High,
}

impl UtilizationLevel {
    pub const HIGH_THRESHOLD: f64 = 80.0;
    pub const MEDIUM_THRESHOLD: f64 = 50.0;

    pub fn of(utilization: f64) -> Self {
        if utilization >= Self::HIGH_THRESHOLD {
            Self::High
        } else if utilization >= Self::MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}
