use tracing_subscriber::{
    fmt::{self, format::FmtSpan, MakeWriter},
    registry::LookupSpan,
    Layer,
};

use super::LogFormat;

/// Builds a fmt layer for `format`, boxed so the concrete format type is erased.
pub(crate) fn build_layer<S, W>(
    format: LogFormat,
    with_ansi: bool,
    with_target: bool,
    writer: W,
) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(with_ansi)
        .with_target(with_target);

    match format {
        LogFormat::Json => layer
            .event_format(fmt::format().json().with_current_span(true))
            .boxed(),
        LogFormat::Pretty => layer
            .event_format(fmt::format().pretty())
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        LogFormat::Compact => layer.event_format(fmt::format().compact()).boxed(),
    }
}
