//! Sidecar configuration objects.
//!
//! Loading and validating these from disk belongs to the outer service;
//! this module only defines the typed shapes with their defaults.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level sidecar configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidecarConfig {
    #[serde(default)]
    pub health_check: HealthCheckConfig,
}

/// Settings for the periodic health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckConfig {
    /// Delay before the first cycle, in milliseconds.
    #[serde(default = "default_initial_delay_millis")]
    pub initial_delay_millis: u64,
    /// Interval between cycles, in milliseconds.
    #[serde(default = "default_check_interval_millis")]
    pub check_interval_millis: u64,
}

impl HealthCheckConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_millis)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_millis)
    }
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            initial_delay_millis: default_initial_delay_millis(),
            check_interval_millis: default_check_interval_millis(),
        }
    }
}

fn default_initial_delay_millis() -> u64 {
    0
}

fn default_check_interval_millis() -> u64 {
    30_000
}
