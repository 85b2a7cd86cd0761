//! Errors raised by the resolution engine.

use thiserror::Error;

use crate::pipeline::HandlerDescriptor;
use crate::resolution::outcome::UnresolvedReason;

/// Conditions the engine refuses to fold into an outcome.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Selection produced a static file, redirect or system handler.
    /// This is a test-authoring or wiring mistake, not a pipeline result.
    #[error("only application handlers can be resolved, but the request resolved to {descriptor}")]
    NotApplicable { descriptor: HandlerDescriptor },

    /// The blocking runtime could not be created.
    #[error("failed to start resolution runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

impl ResolveError {
    /// The outcome reason this error corresponds to, if any.
    pub fn reason(&self) -> Option<UnresolvedReason> {
        match self {
            ResolveError::NotApplicable { .. } => Some(UnresolvedReason::NotAHandlerAction),
            ResolveError::Runtime(_) => None,
        }
    }
}

/// Result type for resolution operations.
pub type ResolveResult<T> = Result<T, ResolveError>;
