//! Route and response testing toolkit.
//!
//! Drives a synthetic HTTP request through a host's routing pipeline
//! (route match → handler select → argument bind) and reports which handler
//! would run, with what arguments, without executing it. Responses produced
//! by a `tower::Service` can be captured and checked the same way.

pub mod assertions;
pub mod config;
pub mod http;
pub mod observability;
pub mod pipeline;
pub mod resolution;
pub mod routing;

pub use assertions::{assert_response, assert_route, AssertionError, AssertionResult};
pub use config::schema::ProbeConfig;
pub use http::{ProducedResponse, ResponseCapture, SyntheticRequest};
pub use pipeline::PipelineAdapter;
pub use resolution::{resolve_async, ResolvedOutcome, RouteResolver};
pub use routing::RouteTable;
