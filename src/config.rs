//! Application configuration loaded from environment variables.

use std::env;

/// Reporting configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of trailing weeks shown on the dashboard
    pub weekly_scale: u32,
    /// Number of trailing months shown on the dashboard
    pub monthly_scale: u32,
    /// Whole-history reports use week granularity up to this many months,
    /// month granularity beyond it
    pub history_month_threshold: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            weekly_scale: 12,
            monthly_scale: 12,
            history_month_threshold: 12,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparseable variables fall back to the defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();
        Self {
            weekly_scale: env_u32("RUNLOG_WEEKLY_SCALE", defaults.weekly_scale),
            monthly_scale: env_u32("RUNLOG_MONTHLY_SCALE", defaults.monthly_scale),
            history_month_threshold: env_u32(
                "RUNLOG_HISTORY_MONTH_THRESHOLD",
                defaults.history_month_threshold,
            ),
        }
    }
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
