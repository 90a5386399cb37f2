//! Real-time requirements of the monitored device.

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Environment variable prefix for requirement overrides,
/// e.g. `TIMING_DOCTOR_COMMUNICATION_PERIOD=500`.
pub const ENV_PREFIX: &str = "TIMING_DOCTOR";

/// Named timing requirements, all in milliseconds.
///
/// Only `communication_period` is checked by the analyzer. The other
/// values describe the firmware's task periods and are carried for
/// reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementsConfig {
    /// Sensor task period.
    pub sensor_reading: u64,
    /// Maximum processing time per reading.
    pub processing_time: u64,
    /// Maximum delay between a state change and actuation.
    pub actuation_delay: u64,
    /// Nominal period between status lines.
    pub communication_period: u64,
}

impl Default for RequirementsConfig {
    fn default() -> Self {
        Self {
            sensor_reading: 500,
            processing_time: 10,
            actuation_delay: 100,
            communication_period: 1000,
        }
    }
}

impl RequirementsConfig {
    /// Load requirements from defaults, an optional config file, and the
    /// environment, in increasing order of precedence.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("sensor_reading", defaults.sensor_reading as i64)?
            .set_default("processing_time", defaults.processing_time as i64)?
            .set_default("actuation_delay", defaults.actuation_delay as i64)?
            .set_default("communication_period", defaults.communication_period as i64)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
