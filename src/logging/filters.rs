use tracing_subscriber::EnvFilter;

use super::LoggingConfig;

/// `RUST_LOG` wins over the configured level. An invalid configured
/// directive falls back to `info`.
pub(crate) fn build_filter(config: &LoggingConfig) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    match EnvFilter::try_new(&config.level) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!(
                "Invalid log filter directive '{}': {e}; falling back to 'info'",
                config.level
            );
            EnvFilter::new("info")
        }
    }
}
