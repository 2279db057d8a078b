use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::{LogFormat, LoggingConfig};

/// Installs the global subscriber. Logs go to stderr so command output on
/// stdout stays machine readable. `RUST_LOG` overrides the configured level.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    // Flow spans carry the flow id; closing them logs each flow's duration
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE);

    match config.format {
        LogFormat::Json => registry.with(layer.json()).init(),
        LogFormat::Pretty => registry.with(layer.pretty().with_target(true)).init(),
        // One line per event, for interactive CLI use
        LogFormat::Compact => registry.with(layer.compact().with_target(false)).init(),
    }

    tracing::debug!(format = ?config.format, "Logging initialized with level: {}", config.level);
}
