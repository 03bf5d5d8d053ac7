//! Engine configuration loaded from TOML
//!
//! ```toml
//! [database]
//! path = "/var/lib/haven/haven.db"
//! busy_timeout_ms = 5000
//!
//! [policy]
//! cancellation_window_hours = 24
//! payment_tolerance_cents = 1
//! currency = "USD"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::DEFAULT_BUSY_TIMEOUT;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HavenConfig {
    pub database: DatabaseConfig,
    pub policy: BookingPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file; the binary falls back to its data directory when unset
    pub path: Option<PathBuf>,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT.as_millis() as u64,
        }
    }
}

impl DatabaseConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Longest accepted cancellation window, one year
pub const MAX_CANCELLATION_WINDOW_HOURS: i64 = 24 * 365;

/// Business knobs of the booking lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingPolicy {
    /// No guest cancellation within this many hours of check-in
    pub cancellation_window_hours: i64,
    /// Largest accepted difference between paid amount and booking total
    pub payment_tolerance_cents: i64,
    /// Currency recorded on payments
    pub currency: String,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            cancellation_window_hours: 24,
            payment_tolerance_cents: 1,
            currency: "USD".to_string(),
        }
    }
}

impl BookingPolicy {
    pub fn validate(&self) -> Result<()> {
        if self.cancellation_window_hours < 0 {
            return Err(Error::Config(
                "cancellation_window_hours must not be negative".to_string(),
            ));
        }
        if self.cancellation_window_hours > MAX_CANCELLATION_WINDOW_HOURS {
            return Err(Error::Config(format!(
                "cancellation_window_hours must be at most {MAX_CANCELLATION_WINDOW_HOURS}"
            )));
        }
        if self.payment_tolerance_cents < 0 {
            return Err(Error::Config(
                "payment_tolerance_cents must not be negative".to_string(),
            ));
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(Error::Config(format!(
                "currency must be a 3-letter ISO code, got {:?}",
                self.currency
            )));
        }
        Ok(())
    }
}

impl HavenConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: HavenConfig = toml::from_str(s)?;
        config.policy.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
