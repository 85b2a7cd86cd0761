//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! probe.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProbeConfig (validated, immutable)
//!     → passed explicitly to RouteResolver / ResponseCapture / request builder
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - No process-wide config; each fixture owns its copy

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError, ConfigResult};
pub use schema::{
    LogFormat, LoggingConfig, ProbeConfig, RequestDefaults, RouteConfig, RuntimeConfig,
    RuntimeFlavor,
};
pub use validation::{validate_config, ValidationError};
