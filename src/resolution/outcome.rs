//! Resolution outcome model.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::pipeline::{BoundArguments, RouteValues, ValidationState};

/// A request that made it through matching, selection and binding.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoute {
    /// Fully qualified type implementing the handler group.
    pub handler_type: String,
    /// Handler group (controller) name.
    pub handler_group_name: String,
    /// Handler (action) name.
    pub handler_name: String,
    /// Exactly the handler's declared parameters.
    pub bound_arguments: BoundArguments,
    /// Route values as produced by route matching.
    pub route_values: RouteValues,
    /// Validation errors recorded while binding.
    pub validation_state: ValidationState,
}

impl ResolvedRoute {
    /// Bound value of a declared parameter.
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.bound_arguments.get(name)
    }

    /// Deserialize a bound argument into a concrete type.
    pub fn argument_as<T: DeserializeOwned>(&self, name: &str) -> Option<serde_json::Result<T>> {
        self.argument(name).map(|v| T::deserialize(v))
    }

    pub fn route_value(&self, name: &str) -> Option<&str> {
        self.route_values.get(name).map(String::as_str)
    }
}

/// Why a request could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// No route matched, or the matched route had no handler.
    NoRouteMatch,
    /// Handler selection raised; carries the fault description.
    SelectionFault(String),
    /// Argument binding raised; carries the fault description.
    BindingFault(String),
    /// Selection produced something other than an application handler.
    NotAHandlerAction,
}

impl UnresolvedReason {
    /// Stable snake_case name, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            UnresolvedReason::NoRouteMatch => "no_route_match",
            UnresolvedReason::SelectionFault(_) => "selection_fault",
            UnresolvedReason::BindingFault(_) => "binding_fault",
            UnresolvedReason::NotAHandlerAction => "not_a_handler_action",
        }
    }

    /// Captured fault description, if any.
    pub fn fault_message(&self) -> Option<&str> {
        match self {
            UnresolvedReason::SelectionFault(m) | UnresolvedReason::BindingFault(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::NoRouteMatch => write!(f, "no route or handler matched the request"),
            UnresolvedReason::SelectionFault(m) => {
                write!(f, "handler selection failed: '{}'", m)
            }
            UnresolvedReason::BindingFault(m) => write!(f, "argument binding failed: '{}'", m),
            UnresolvedReason::NotAHandlerAction => {
                write!(f, "the request did not resolve to an application handler")
            }
        }
    }
}

/// Result of driving one synthetic request through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedOutcome {
    Resolved(ResolvedRoute),
    Unresolved(UnresolvedReason),
}

impl ResolvedOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolvedOutcome::Resolved(_))
    }

    pub fn resolved(&self) -> Option<&ResolvedRoute> {
        match self {
            ResolvedOutcome::Resolved(route) => Some(route),
            ResolvedOutcome::Unresolved(_) => None,
        }
    }

    pub fn unresolved(&self) -> Option<&UnresolvedReason> {
        match self {
            ResolvedOutcome::Resolved(_) => None,
            ResolvedOutcome::Unresolved(reason) => Some(reason),
        }
    }

    pub fn into_resolved(self) -> Result<ResolvedRoute, UnresolvedReason> {
        match self {
            ResolvedOutcome::Resolved(route) => Ok(route),
            ResolvedOutcome::Unresolved(reason) => Err(reason),
        }
    }

    /// Stable snake_case name of the outcome kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolvedOutcome::Resolved(_) => "resolved",
            ResolvedOutcome::Unresolved(reason) => reason.kind(),
        }
    }
}

impl fmt::Display for ResolvedOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedOutcome::Resolved(r) => write!(
                f,
                "resolved to {}.{} ({})",
                r.handler_group_name, r.handler_name, r.handler_type
            ),
            ResolvedOutcome::Unresolved(reason) => {
                write!(f, "it could not be resolved: '{}'", reason)
            }
        }
    }
}
