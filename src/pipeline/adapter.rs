//! The three-stage contract a host application implements.
//!
//! Stages are asynchronous so hosts can plug in their own dispatch code
//! unchanged; the resolution engine drives them to completion one at a time.

use futures_util::future::BoxFuture;

use crate::http::SyntheticRequest;
use crate::pipeline::descriptor::{ActionDescriptor, HandlerDescriptor};
use crate::pipeline::values::{BoundArguments, RouteValues, ValidationState};

/// Data produced by a successful route match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteData {
    /// Name of the matched route, if the host names its routes.
    pub route_name: Option<String>,
    /// Route values, including any seeded on the request.
    pub values: RouteValues,
}

impl RouteData {
    pub fn new(values: RouteValues) -> Self {
        Self {
            route_name: None,
            values,
        }
    }

    pub fn named(name: impl Into<String>, values: RouteValues) -> Self {
        Self {
            route_name: Some(name.into()),
            values,
        }
    }
}

/// Result of route matching. "No match" is an expected result, not a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteLookup {
    Matched(RouteData),
    NoMatch,
}

/// A failure raised by a pipeline stage.
///
/// Carries only a human-readable description so outcomes stay comparable
/// across runs and host versions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct PipelineFault {
    message: String,
}

impl PipelineFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Capture an error's display text, dropping its type and source chain.
    pub fn from_error(err: &dyn std::error::Error) -> Self {
        Self::new(err.to_string())
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_message(self) -> String {
        self.message
    }
}

/// Inputs available to argument binding.
#[derive(Debug, Clone, Copy)]
pub struct BindingContext<'a> {
    pub request: &'a SyntheticRequest,
    pub route: &'a RouteData,
    pub action: &'a ActionDescriptor,
}

/// Matches a request against the host's routes.
pub trait RouteMatcher: Send + Sync {
    fn match_route<'a>(&'a self, request: &'a SyntheticRequest) -> BoxFuture<'a, RouteLookup>;
}

/// Chooses the handler for a matched route.
pub trait HandlerSelector: Send + Sync {
    /// `Ok(None)` means no handler exists for the route.
    fn select_handler<'a>(
        &'a self,
        request: &'a SyntheticRequest,
        route: &'a RouteData,
    ) -> BoxFuture<'a, Result<Option<HandlerDescriptor>, PipelineFault>>;
}

/// Binds an action's declared parameters from request data.
pub trait ArgumentBinder: Send + Sync {
    /// Validation errors are written into `validation`, which the caller
    /// reads back once the future completes.
    fn bind_arguments<'a>(
        &'a self,
        ctx: BindingContext<'a>,
        validation: &'a mut ValidationState,
    ) -> BoxFuture<'a, Result<BoundArguments, PipelineFault>>;
}

/// The full capability set a host supplies to the resolution engine.
///
/// Implementations must be safe for concurrent use if tests resolve
/// requests in parallel against a shared adapter.
pub trait PipelineAdapter: RouteMatcher + HandlerSelector + ArgumentBinder {}

impl<T> PipelineAdapter for T where T: RouteMatcher + HandlerSelector + ArgumentBinder {}
