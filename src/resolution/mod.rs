//! Request resolution subsystem.
//!
//! # Data Flow
//! ```text
//! SyntheticRequest + &dyn PipelineAdapter
//!     → engine.rs
//!         Start → RouteMatched → HandlerSelected → ArgumentsBound → Resolved
//!           ↓          ↓               ↓                ↓
//!        NoMatch   NoMatch /      NotApplicable   BindingFaulted
//!                  SelectionFaulted  (error)
//!     → outcome.rs (ResolvedOutcome: Resolved | Unresolved(reason))
//! ```
//!
//! # Design Decisions
//! - "No match" is data, faults are data, a non-action descriptor is an error
//! - Fault text only; no type names or backtraces in outcomes
//! - Deterministic: the same request and pipeline give an equal outcome

pub mod engine;
pub mod error;
pub mod outcome;

pub use engine::{resolve_async, ResolutionStage, RouteResolver};
pub use error::{ResolveError, ResolveResult};
pub use outcome::{ResolvedOutcome, ResolvedRoute, UnresolvedReason};
