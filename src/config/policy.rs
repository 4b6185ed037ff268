//! Policy configuration loading from config.toml
//!
//! The reminder schedule and the risk-score weights are deployment policy,
//! not algorithm, so they live in a TOML file rather than in code. Every
//! knob has a built-in default and a missing file simply means defaults.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Everything config.toml can set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Monthly reminder sweep schedule
    pub reminder: ReminderPolicy,
    /// Risk-score weights and thresholds
    pub risk: RiskPolicy,
}

/// When the monthly reminder sweep runs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReminderPolicy {
    /// Day of the month on which the sweep becomes due
    pub day_of_month: u32,
    /// How often the daemon re-checks whether a sweep is due, in seconds
    pub check_interval_secs: u64,
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        Self {
            day_of_month: 5,
            check_interval_secs: 60,
        }
    }
}

/// Weights and thresholds of the payment-risk score.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RiskPolicy {
    /// Risk added per recorded late payment
    pub late_weight: f64,
    /// Cap on the late-payment contribution
    pub late_cap: f64,
    /// Divisor normalizing the average delay in days
    pub delay_divisor: f64,
    /// Weight (and cap) of the delay contribution
    pub delay_weight: f64,
    /// Tenancies longer than this many months earn a discount
    pub tenure_threshold_months: u32,
    /// Divisor normalizing the months beyond the threshold
    pub tenure_divisor: f64,
    /// Maximum tenure discount
    pub tenure_discount: f64,
    /// Probability at or above which the level is High
    pub high_threshold: f64,
    /// Probability at or above which the level is Medium
    pub medium_threshold: f64,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            late_weight: 0.08,
            late_cap: 0.4,
            delay_divisor: 30.0,
            delay_weight: 0.3,
            tenure_threshold_months: 12,
            tenure_divisor: 60.0,
            tenure_discount: 0.2,
            high_threshold: 0.7,
            medium_threshold: 0.4,
        }
    }
}

/// Loads policy from a TOML file. A missing file yields the defaults; a
/// present but malformed file is an error.
pub fn load_policy<P: AsRef<Path>>(path: P) -> Result<Policy> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Policy::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read policy file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path.display()),
    })
}

/// Loads policy from the default location (./config.toml).
pub fn load_default_policy() -> Result<Policy> {
    load_policy("config.toml")
}
