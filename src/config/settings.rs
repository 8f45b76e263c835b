use std::{path::Path, time::Duration};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tidemq_error::{ensure, TideResult};

use crate::{BrokerOptions, LoggingConfig, SettingsError};

/// Process settings.
///
/// Sources, lowest priority first: built-in defaults, an optional config file,
/// `TIDEMQ_*` environment variables (`__` separates nested keys, e.g.
/// `TIDEMQ_LOGGING__LEVEL=debug`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub broker_name: String,
    /// Per-message delivery timeout, `0` disables it.
    pub delivery_timeout_ms: u64,
    pub max_concurrent_deliveries: usize,
    pub event_capacity: usize,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            broker_name: "tidemq".to_string(),
            delivery_timeout_ms: 5000,
            max_concurrent_deliveries: 64,
            event_capacity: 1024,
            logging: LoggingConfig::default(),
        }
    }
}

impl Settings {
    /// Loads defaults and environment only.
    pub fn load() -> TideResult<Self> {
        Self::load_from(None)
    }

    /// Loads defaults, then `path` (format by extension), then environment.
    pub fn load_from(path: Option<&Path>) -> TideResult<Self> {
        let mut builder = Config::builder()
            // Defaults
            .set_default("broker_name", "tidemq")
            .and_then(|b| b.set_default("delivery_timeout_ms", 5000_i64))
            .and_then(|b| b.set_default("max_concurrent_deliveries", 64_i64))
            .and_then(|b| b.set_default("event_capacity", 1024_i64))
            .map_err(load_error)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings: Settings = builder
            // Environment variables with the TIDEMQ_ prefix
            .add_source(
                Environment::with_prefix("TIDEMQ")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(Config::try_deserialize)
            .map_err(load_error)?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> TideResult<()> {
        ensure!(
            self.max_concurrent_deliveries > 0,
            SettingsError::invalid("max_concurrent_deliveries", "must be at least 1")
        );
        ensure!(
            self.event_capacity > 0,
            SettingsError::invalid("event_capacity", "must be at least 1")
        );
        self.logging.validate()
    }

    pub fn delivery_timeout(&self) -> Option<Duration> {
        (self.delivery_timeout_ms > 0).then(|| Duration::from_millis(self.delivery_timeout_ms))
    }

    pub fn broker_options(&self) -> BrokerOptions {
        BrokerOptions {
            delivery_timeout: self.delivery_timeout(),
            max_concurrent_deliveries: self.max_concurrent_deliveries,
            event_capacity: self.event_capacity,
        }
    }
}

fn load_error(err: config::ConfigError) -> SettingsError {
    SettingsError::Load {
        reason: err.to_string(),
    }
}
