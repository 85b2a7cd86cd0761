//! Fluent assertion surface.
//!
//! # Data Flow
//! ```text
//! ResolvedOutcome  → route.rs    (handler identity, arguments, validation, unresolved kind)
//! ProducedResponse → response.rs (status, body, headers, cookies)
//!     → AssertionResult<Self> (chain with `?`)
//! ```
//!
//! # Design Decisions
//! - Checks return errors instead of panicking, so tests choose how to fail
//! - Every failure message names the expected and actual values

pub mod error;
pub mod response;
pub mod route;

pub use error::{AssertionError, AssertionResult};
pub use response::{assert_response, ResponseAssertions};
pub use route::{assert_route, RouteAssertions};
