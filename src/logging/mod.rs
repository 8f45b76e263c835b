//! Tracing setup: an env filter plus boxed console and file layers.

pub mod config;
mod filters;
mod formatter;
pub mod handle;
pub mod sinks;

pub use self::config::{FileConfig, LogFormat, LoggingConfig};
pub use handle::LoggingHandle;
use tidemq_error::{ResultExt, TideResult};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

use crate::SettingsError;

/// Installs the global subscriber.
///
/// Fails if the config is invalid, the log directory cannot be created, or a
/// global subscriber is already set.
pub fn init_logging(config: LoggingConfig) -> TideResult<LoggingHandle> {
    config.validate()?;
    config.ensure_log_dir()?;

    let env_filter = filters::build_filter(&config);
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    // Console layer
    layers.push(sinks::console::layer(&config));

    // File layer
    let file_guard = if config.file.enabled {
        let (file_layer, guard) = sinks::file::layer(&config);
        layers.push(file_layer);
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .map_err(|e| SettingsError::Logging {
            reason: e.to_string(),
        })
        .context("installing global subscriber")?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        level = %config.level,
        format = ?config.format,
        file_enabled = config.file.enabled,
        log_dir = %config.file.dir.display(),
        "Logging initialized"
    );

    Ok(LoggingHandle::new(file_guard))
}
