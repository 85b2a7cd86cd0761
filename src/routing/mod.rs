//! In-memory routing pipeline.
//!
//! A declarative `PipelineAdapter` for fixtures that do not wrap a real host
//! framework. It is a test double, not a production router.
//!
//! # Data Flow
//! ```text
//! SyntheticRequest (method, host, path, seeded route values)
//!     → table.rs (scan routes in priority order)
//!     → matcher.rs (evaluate method / host / template conditions)
//!     → template.rs (capture route values)
//!     → Return: Matched(RouteData) or NoMatch
//!
//! Selection: top-priority candidates → handler table (ambiguity is a fault)
//! Binding:   binder.rs (route / query / header / JSON body → typed values)
//!
//! Route Compilation (at construction):
//!     RouteConfig[]
//!     → Validate handler references
//!     → Compile matchers
//!     → Sort by priority, freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled once, immutable afterwards
//! - Deterministic: same input always matches same route
//! - Higher priority wins; ties between different handlers are ambiguous

pub mod binder;
pub mod matcher;
pub mod table;
pub mod template;

pub use table::{RouteTable, RouteTableBuilder, RouteTableError, AMBIGUOUS_MATCH};
pub use template::{PathTemplate, TemplateError};
