//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the log filter parses
//! - Validate value ranges (worker threads, body limit)
//! - Check default headers are valid HTTP
//! - Check referential integrity (routes reference existing handlers)
//! - Check route templates and methods parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProbeConfig → Result<(), Vec<ValidationError>>

use std::collections::BTreeSet;

use axum::http::header::{HeaderName, HeaderValue};
use axum::http::Method;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::{ProbeConfig, RuntimeFlavor};
use crate::routing::template::PathTemplate;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("logging.filter is invalid: {0}")]
    InvalidFilter(String),

    #[error("runtime.worker_threads must be greater than 0 for the multi_thread flavor")]
    NoWorkerThreads,

    #[error("runtime.body_limit_bytes must be greater than 0")]
    ZeroBodyLimit,

    #[error("requests.headers has an invalid header name: '{0}'")]
    InvalidHeaderName(String),

    #[error("requests.headers.{0} has an invalid value")]
    InvalidHeaderValue(String),

    #[error("route '{0}' is defined more than once")]
    DuplicateRoute(String),

    #[error("route '{route}' has an invalid template: {reason}")]
    InvalidTemplate { route: String, reason: String },

    #[error("route '{route}' has an invalid method: '{method}'")]
    InvalidMethod { route: String, method: String },

    #[error("route '{route}' references unknown handler '{handler}'")]
    UnknownHandler { route: String, handler: String },
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ProbeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = EnvFilter::try_new(&config.logging.filter) {
        errors.push(ValidationError::InvalidFilter(e.to_string()));
    }

    if config.runtime.flavor == RuntimeFlavor::MultiThread && config.runtime.worker_threads == 0 {
        errors.push(ValidationError::NoWorkerThreads);
    }

    if config.runtime.body_limit_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    for (name, value) in &config.requests.headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeaderName(name.clone()));
        } else if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::InvalidHeaderValue(name.clone()));
        }
    }

    let mut route_names = BTreeSet::new();
    for route in &config.routes {
        if !route_names.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRoute(route.name.clone()));
        }
        if let Err(e) = PathTemplate::parse(&route.template) {
            errors.push(ValidationError::InvalidTemplate {
                route: route.name.clone(),
                reason: e.to_string(),
            });
        }
        for method in &route.methods {
            if Method::from_bytes(method.to_ascii_uppercase().as_bytes()).is_err() {
                errors.push(ValidationError::InvalidMethod {
                    route: route.name.clone(),
                    method: method.clone(),
                });
            }
        }
        if !config.handlers.contains_key(&route.handler) {
            errors.push(ValidationError::UnknownHandler {
                route: route.name.clone(),
                handler: route.handler.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
