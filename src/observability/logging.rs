//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Configure log level from `RUST_LOG` or config
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Output goes through the test harness capture by default
//! - Initialization is idempotent so every test may call it

use tracing::Subscriber;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{LogFormat, LoggingConfig};

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed (e.g. by an
/// earlier test in the same binary).
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer(config))
        .try_init()
        .is_ok()
}

fn fmt_layer<S>(config: &LoggingConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    // Span close events carry the time spent resolving.
    let layer = tracing_subscriber::fmt::layer().with_span_events(FmtSpan::CLOSE);
    match (config.format, config.test_writer) {
        (LogFormat::Full, true) => layer.with_test_writer().boxed(),
        (LogFormat::Full, false) => layer.boxed(),
        (LogFormat::Compact, true) => layer.compact().with_test_writer().boxed(),
        (LogFormat::Compact, false) => layer.compact().boxed(),
        (LogFormat::Pretty, true) => layer.pretty().with_test_writer().boxed(),
        (LogFormat::Pretty, false) => layer.pretty().boxed(),
    }
}
