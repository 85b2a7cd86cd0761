//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Resolution engine / response capture produce:
//!     → logging.rs (structured log events, resolve_route spans)
//!     → metrics.rs (outcome counters, duration histograms)
//! ```
//!
//! # Design Decisions
//! - Every resolution carries a correlation ID on its span
//! - Metrics are cheap and exporter-agnostic

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
