use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{registry::LookupSpan, Layer};

use crate::logging::{formatter, LoggingConfig};

/// Daily-rolling file layer. The guard must outlive the subscriber, otherwise
/// buffered lines are lost.
pub fn layer<S>(config: &LoggingConfig) -> (Box<dyn Layer<S> + Send + Sync>, WorkerGuard)
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let appender = rolling::daily(&config.file.dir, &config.file.prefix);
    let (writer, guard) = non_blocking(appender);

    // No ANSI escapes in files.
    let layer = formatter::build_layer(config.format, false, config.with_target, writer);
    (layer, guard)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tracing_subscriber::{prelude::*, registry::Registry};

    use super::*;

    #[test]
    fn test_writes_to_log_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = LoggingConfig::default();
        config.file.enabled = true;
        config.file.dir = tmp.path().to_path_buf();

        let (layer, guard) = layer::<Registry>(&config);
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("written to file");
        });
        drop(guard);

        let contents: String = fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().starts_with("tidemq.log"))
            .map(|entry| fs::read_to_string(entry.path()).unwrap())
            .collect();
        assert!(contents.contains("written to file"));
    }
}
