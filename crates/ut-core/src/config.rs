//! Utilization settings as supplied by the caller.

use serde::{Deserialize, Serialize};

use crate::stats::StatsOptions;
use crate::window::{ConfigError, OperatingWindow};

/// Operating hours and which statistics to produce.
///
/// Zero hours and "no statistics at all" are treated as unset; see
/// [`UtilizationConfig::normalized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UtilizationConfig {
    /// Opening hour. Default: 6 (6 AM).
    pub start_hour: u32,
    /// Closing hour. Default: 18 (6 PM).
    pub end_hour: u32,
    pub show_daily_stats: bool,
    pub show_weekly_stats: bool,
}

impl Default for UtilizationConfig {
    fn default() -> Self {
        Self {
            start_hour: OperatingWindow::DEFAULT_START_HOUR,
            end_hour: OperatingWindow::DEFAULT_END_HOUR,
            show_daily_stats: true,
            show_weekly_stats: true,
        }
    }
}

impl UtilizationConfig {
    /// Applies defaults to unset values.
    ///
    /// A zero hour falls back to its default, and disabling both statistics
    /// levels enables both.
    #[must_use]
    pub const fn normalized(self) -> Self {
        let defaults = Self {
            start_hour: OperatingWindow::DEFAULT_START_HOUR,
            end_hour: OperatingWindow::DEFAULT_END_HOUR,
            show_daily_stats: true,
            show_weekly_stats: true,
        };
        let both_hidden = !self.show_daily_stats && !self.show_weekly_stats;
        Self {
            start_hour: if self.start_hour == 0 {
                defaults.start_hour
            } else {
                self.start_hour
            },
            end_hour: if self.end_hour == 0 {
                defaults.end_hour
            } else {
                self.end_hour
            },
            show_daily_stats: self.show_daily_stats || both_hidden,
            show_weekly_stats: self.show_weekly_stats || both_hidden,
        }
    }

    /// Validated operating window of the normalized config.
    pub const fn operating_window(self) -> Result<OperatingWindow, ConfigError> {
        let normalized = self.normalized();
        OperatingWindow::new(normalized.start_hour, normalized.end_hour)
    }

    /// Aggregation levels of the normalized config.
    pub const fn stats_options(self) -> StatsOptions {
        let normalized = self.normalized();
        StatsOptions {
            daily: normalized.show_daily_stats,
            weekly: normalized.show_weekly_stats,
        }
    }
}
