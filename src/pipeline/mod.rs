//! Pipeline adapter boundary.
//!
//! # Data Flow
//! ```text
//! SyntheticRequest
//!     → RouteMatcher::match_route     (Matched(RouteData) | NoMatch)
//!     → HandlerSelector::select_handler (descriptor | none | fault)
//!     → ArgumentBinder::bind_arguments  (arguments + validation side channel)
//! ```
//!
//! # Design Decisions
//! - Host internals never leak past these traits
//! - Faults carry a description only, never a type name
//! - Validation state is an explicit out-parameter, not a global store

pub mod adapter;
pub mod descriptor;
pub mod values;

pub use adapter::{
    ArgumentBinder, BindingContext, HandlerSelector, PipelineAdapter, PipelineFault, RouteData,
    RouteLookup, RouteMatcher,
};
pub use descriptor::{
    ActionDescriptor, BindingSource, HandlerDescriptor, ParameterDescriptor, ParameterKind,
};
pub use values::{BoundArguments, RouteValues, ValidationState};
