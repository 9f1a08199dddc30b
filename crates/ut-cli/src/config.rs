//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use ut_core::UtilizationConfig;

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Calendar to read bookings from.
    pub calendar_id: String,
    /// Google OAuth client credentials (`credentials.json`).
    pub credentials_path: PathBuf,
    /// Stored OAuth token (`token.json`).
    pub token_path: PathBuf,
    /// Upper bound for a complete calendar retrieval, in seconds.
    pub fetch_timeout_secs: u64,
    #[serde(default)]
    pub utilization: UtilizationConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("calendar_id", &self.calendar_id)
            .field("credentials_path", &self.credentials_path)
            .field("token_path", &self.token_path)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("utilization", &self.utilization)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs_config_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            calendar_id: "primary".to_string(),
            credentials_path: config_dir.join("credentials.json"),
            token_path: config_dir.join("token.json"),
            fetch_timeout_secs: ut_gcal::DEFAULT_TIMEOUT.as_secs(),
            utilization: UtilizationConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Unset utilization values are normalized to their defaults here, so
    /// every consumer sees the effective settings.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (UT_*, nested keys split on `__`)
        figment = figment.merge(Env::prefixed("UT_").split("__"));

        let mut config: Self = figment.extract()?;
        config.utilization = config.utilization.normalized();
        Ok(config)
    }

    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Returns the platform-specific config directory for ut.
///
/// On Linux: `~/.config/ut`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ut"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_config_path_ends_with_ut() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "ut");
    }

    #[test]
    fn test_default_config_uses_config_dir_for_credentials() {
        let config = Config::default();
        let config_dir = dirs_config_path().unwrap();
        assert_eq!(config.credentials_path, config_dir.join("credentials.json"));
        assert_eq!(config.token_path, config_dir.join("token.json"));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.utilization, UtilizationConfig::default());
    }

    #[test]
    fn test_file_overrides_defaults_and_is_normalized() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        let contents = r#"
calendar_id = "courts@example.com"
fetch_timeout_secs = 5

[utilization]
start_hour = 0
end_hour = 21
show_daily_stats = false
show_weekly_stats = false
"#;
        std::fs::write(&path, contents).unwrap();

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.calendar_id, "courts@example.com");
        assert_eq!(config.fetch_timeout_secs, 5);
        assert_eq!(config.utilization.start_hour, 6);
        assert_eq!(config.utilization.end_hour, 21);
        assert!(config.utilization.show_daily_stats);
        assert!(config.utilization.show_weekly_stats);
    }

    #[test]
    fn test_partial_utilization_table_keeps_other_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[utilization]\nshow_weekly_stats = false\n").unwrap();

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.utilization.start_hour, 6);
        assert_eq!(config.utilization.end_hour, 18);
        assert!(config.utilization.show_daily_stats);
        assert!(!config.utilization.show_weekly_stats);
    }
}
