//! Fluent checks over a [`ResolvedOutcome`].
//!
//! Every check consumes and returns the assertion so calls chain with `?`:
//!
//! ```ignore
//! assert_route(&outcome)
//!     .to_handler("Items", "GetById")?
//!     .with_argument("id", 42)?
//!     .with_valid_model_state()?;
//! ```
//!
//! A check that needs a resolved outcome fails on an unresolved one (and the
//! other way round); the message then names both kinds.

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::assertions::error::{ensure_eq, AssertionError, AssertionResult};
use crate::resolution::{ResolvedOutcome, ResolvedRoute, UnresolvedReason};

/// Start checking an outcome.
pub fn assert_route(outcome: &ResolvedOutcome) -> RouteAssertions<'_> {
    RouteAssertions::new(outcome)
}

#[derive(Debug, Clone, Copy)]
pub struct RouteAssertions<'a> {
    outcome: &'a ResolvedOutcome,
}

impl<'a> RouteAssertions<'a> {
    pub fn new(outcome: &'a ResolvedOutcome) -> Self {
        Self { outcome }
    }

    pub fn outcome(&self) -> &'a ResolvedOutcome {
        self.outcome
    }

    fn resolved(&self) -> AssertionResult<&'a ResolvedRoute> {
        match self.outcome {
            ResolvedOutcome::Resolved(route) => Ok(route),
            ResolvedOutcome::Unresolved(_) => Err(AssertionError::new(format!(
                "expected the request to resolve to a handler, but {}",
                self.outcome
            ))),
        }
    }

    fn unresolved(&self, expected: &str) -> AssertionResult<&'a UnresolvedReason> {
        match self.outcome {
            ResolvedOutcome::Unresolved(reason) => Ok(reason),
            ResolvedOutcome::Resolved(_) => Err(AssertionError::new(format!(
                "expected the request to be unresolved ({expected}), but it {}",
                self.outcome
            ))),
        }
    }

    fn argument(&self, name: &str) -> AssertionResult<&'a Value> {
        let route = self.resolved()?;
        route.argument(name).ok_or_else(|| {
            AssertionError::new(format!(
                "expected argument '{name}' to be bound, but the handler declares {:?}",
                route.bound_arguments.keys().collect::<Vec<_>>()
            ))
        })
    }

    /// Resolved to `group.name`.
    pub fn to_handler(self, group: &str, name: &str) -> AssertionResult<Self> {
        let route = self.resolved()?;
        if route.handler_group_name == group && route.handler_name == name {
            return Ok(self);
        }
        Err(AssertionError::new(format!(
            "expected the request to resolve to {group}.{name}, but it resolved to {}.{}",
            route.handler_group_name, route.handler_name
        )))
    }

    pub fn with_handler_type(self, handler_type: &str) -> AssertionResult<Self> {
        let route = self.resolved()?;
        ensure_eq(
            "the handler type",
            handler_type,
            route.handler_type.as_str(),
        )?;
        Ok(self)
    }

    /// Bound argument equals `expected` once serialized to JSON.
    pub fn with_argument<T: Serialize>(self, name: &str, expected: T) -> AssertionResult<Self> {
        let actual = self.argument(name)?;
        let expected = serde_json::to_value(expected).map_err(|e| {
            AssertionError::new(format!("expected value for '{name}' is not serializable: {e}"))
        })?;
        ensure_eq(&format!("argument '{name}'"), &expected, actual)?;
        Ok(self)
    }

    /// Bound argument deserializes to `T` and equals `expected`.
    pub fn with_argument_of<T>(self, name: &str, expected: T) -> AssertionResult<Self>
    where
        T: DeserializeOwned + PartialEq + Debug,
    {
        let raw = self.argument(name)?;
        let actual = T::deserialize(raw).map_err(|e| {
            AssertionError::new(format!(
                "expected argument '{name}' to be a {}, but it was {raw} ({e})",
                std::any::type_name::<T>()
            ))
        })?;
        ensure_eq(&format!("argument '{name}'"), expected, actual)?;
        Ok(self)
    }

    /// Argument is bound to null or not declared at all.
    pub fn with_argument_null_or_missing(self, name: &str) -> AssertionResult<Self> {
        let route = self.resolved()?;
        match route.argument(name) {
            None | Some(Value::Null) => Ok(self),
            Some(other) => Err(AssertionError::new(format!(
                "expected argument '{name}' to be null or missing, but it was {other}"
            ))),
        }
    }

    pub fn with_route_value(self, name: &str, expected: &str) -> AssertionResult<Self> {
        let route = self.resolved()?;
        ensure_eq(
            &format!("route value '{name}'"),
            Some(expected),
            route.route_value(name),
        )?;
        Ok(self)
    }

    pub fn with_valid_model_state(self) -> AssertionResult<Self> {
        let route = self.resolved()?;
        if route.validation_state.is_valid() {
            return Ok(self);
        }
        Err(AssertionError::new(format!(
            "expected the validation state to be valid, but it had errors {:?}",
            route.validation_state.as_map()
        )))
    }

    pub fn with_invalid_field(self, field: &str) -> AssertionResult<Self> {
        let route = self.resolved()?;
        if !route.validation_state.errors_for(field).is_empty() {
            return Ok(self);
        }
        Err(AssertionError::new(format!(
            "expected field '{field}' to be invalid, but the invalid fields were {:?}",
            route.validation_state.invalid_fields().collect::<Vec<_>>()
        )))
    }

    pub fn with_field_error(self, field: &str, message: &str) -> AssertionResult<Self> {
        let route = self.resolved()?;
        let errors = route.validation_state.errors_for(field);
        if errors.iter().any(|e| e == message) {
            return Ok(self);
        }
        Err(AssertionError::new(format!(
            "expected field '{field}' to have error {message:?}, but its errors were {errors:?}"
        )))
    }

    /// Unresolved for any reason.
    pub fn to_be_unresolved(self) -> AssertionResult<Self> {
        self.unresolved("any reason")?;
        Ok(self)
    }

    pub fn to_no_match(self) -> AssertionResult<Self> {
        let reason = self.unresolved("no_route_match")?;
        ensure_kind(reason, &UnresolvedReason::NoRouteMatch)?;
        Ok(self)
    }

    pub fn with_selection_fault(self, message: &str) -> AssertionResult<Self> {
        let reason = self.unresolved("selection_fault")?;
        ensure_kind(reason, &UnresolvedReason::SelectionFault(message.to_string()))?;
        Ok(self)
    }

    pub fn with_binding_fault(self, message: &str) -> AssertionResult<Self> {
        let reason = self.unresolved("binding_fault")?;
        ensure_kind(reason, &UnresolvedReason::BindingFault(message.to_string()))?;
        Ok(self)
    }
}

fn ensure_kind(actual: &UnresolvedReason, expected: &UnresolvedReason) -> AssertionResult<()> {
    if actual == expected {
        return Ok(());
    }
    Err(AssertionError::new(format!(
        "expected the request to be unresolved because {expected}, but {actual}"
    )))
}
