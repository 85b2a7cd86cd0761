//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use std::collections::BTreeMap;
use std::io;

use serde::{Deserialize, Serialize};
use tokio::runtime::{Builder, Runtime};

use crate::pipeline::{HandlerDescriptor, RouteValues};

/// Root configuration for a test fixture.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProbeConfig {
    /// Logging settings.
    pub logging: LoggingConfig,

    /// Runtime used to drive asynchronous pipeline stages.
    pub runtime: RuntimeConfig,

    /// Defaults applied to synthetic requests.
    pub requests: RequestDefaults,

    /// Route definitions for the in-memory route table.
    pub routes: Vec<RouteConfig>,

    /// Handlers referenced by routes, keyed by handler key.
    pub handlers: BTreeMap<String, HandlerDescriptor>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,

    /// Output format.
    pub format: LogFormat,

    /// Write through the test harness capture instead of straight to stdout.
    pub test_writer: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "route_probe=info".to_string(),
            format: LogFormat::Full,
            test_writer: true,
        }
    }
}

/// Tokio runtime flavor.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeFlavor {
    #[default]
    CurrentThread,
    MultiThread,
}

/// Runtime configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RuntimeConfig {
    pub flavor: RuntimeFlavor,

    /// Worker threads for the multi-thread flavor.
    pub worker_threads: usize,

    /// Maximum response body buffered by response capture.
    pub body_limit_bytes: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            flavor: RuntimeFlavor::CurrentThread,
            worker_threads: 2,
            body_limit_bytes: 4 * 1024 * 1024,
        }
    }
}

impl RuntimeConfig {
    /// Build a runtime with all drivers enabled.
    ///
    /// A multi-thread runtime with zero workers is rejected with
    /// `InvalidInput` rather than left for tokio to panic on.
    pub fn build_runtime(&self) -> io::Result<Runtime> {
        match self.flavor {
            RuntimeFlavor::CurrentThread => Builder::new_current_thread().enable_all().build(),
            RuntimeFlavor::MultiThread if self.worker_threads == 0 => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "runtime.worker_threads must be greater than 0 for the multi_thread flavor",
            )),
            RuntimeFlavor::MultiThread => Builder::new_multi_thread()
                .worker_threads(self.worker_threads)
                .enable_all()
                .build(),
        }
    }
}

/// Route configuration mapping requests to a handler key.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RouteConfig {
    /// Route identifier, reported as the matched route name.
    pub name: String,

    /// Path template (e.g. "/items/{id}").
    pub template: String,

    /// Key into the handler table.
    pub handler: String,

    /// Allowed methods; empty matches any method.
    #[serde(default)]
    pub methods: Vec<String>,

    /// Host header to match (exact match, case-insensitive).
    #[serde(default)]
    pub host: Option<String>,

    /// Route priority (higher = checked first).
    #[serde(default)]
    pub priority: u32,

    /// Route values supplied when the template does not capture them.
    #[serde(default)]
    pub defaults: RouteValues,
}

impl RouteConfig {
    pub fn new(
        name: impl Into<String>,
        template: impl Into<String>,
        handler: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            handler: handler.into(),
            methods: Vec::new(),
            host: None,
            priority: 0,
            defaults: RouteValues::new(),
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.methods.push(method.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn default_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }
}

/// Defaults applied by `SyntheticRequestBuilder::with_defaults`.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RequestDefaults {
    /// Headers added when the request does not set them.
    pub headers: BTreeMap<String, String>,
}
