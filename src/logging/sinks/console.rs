use std::io::{self, Stdout};

use tracing_subscriber::{registry::LookupSpan, Layer};

use crate::logging::{formatter, LoggingConfig};

/// Stdout layer in the configured format.
pub fn layer<S>(config: &LoggingConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let writer: fn() -> Stdout = io::stdout;
    formatter::build_layer(config.format, config.with_ansi, config.with_target, writer)
}
