//! Configuration for ticket issuance and rendering.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::payload::DEFAULT_SCHEME;
use serde::{Deserialize, Serialize};
use std::env;

/// Ticket configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketConfig {
    /// Validity window of a freshly issued ticket, in minutes (default: 30)
    pub validity_minutes: u32,
    /// Low-time warning threshold, in minutes (default: 5)
    pub low_time_minutes: u32,
    /// Interval between expiry ticks, in milliseconds (default: 1000)
    pub tick_interval_ms: u64,
    /// Side length of the visual code grid (default: 25)
    pub grid_size: usize,
    /// URI scheme of ticket payloads (default: `greedticket`)
    pub scheme: String,
    /// Number of retired tickets kept in history (default: 16)
    pub history_limit: usize,
}

impl TicketConfig {
    /// Load configuration from environment variables.
    ///
    /// Missing or unparseable variables fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            validity_minutes: lookup("GREED_TICKET_VALIDITY_MINUTES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.validity_minutes),
            low_time_minutes: lookup("GREED_TICKET_LOW_TIME_MINUTES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.low_time_minutes),
            tick_interval_ms: lookup("GREED_TICKET_TICK_INTERVAL_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.tick_interval_ms),
            grid_size: lookup("GREED_TICKET_GRID_SIZE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.grid_size),
            scheme: lookup("GREED_TICKET_SCHEME")
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.scheme),
            history_limit: lookup("GREED_TICKET_HISTORY_LIMIT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.history_limit),
        }
    }

    /// Validity window, at least one minute
    #[must_use]
    pub fn validity(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.validity_minutes.max(1)))
    }

    /// Low-time warning threshold
    #[must_use]
    pub fn low_time_threshold(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.low_time_minutes))
    }

    /// Delay between expiry ticks, at least one millisecond
    #[must_use]
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            validity_minutes: 30,
            low_time_minutes: 5,
            tick_interval_ms: 1000,
            grid_size: 25,
            scheme: DEFAULT_SCHEME.to_string(),
            history_limit: 16,
        }
    }
}
