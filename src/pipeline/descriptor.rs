//! Handler descriptors returned by handler selection.

use serde::{Deserialize, Serialize};

/// Where a handler parameter takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingSource {
    /// A matched route value (`/items/{id}`).
    Route,
    /// A query-string parameter.
    Query,
    /// A top-level field of a JSON request body.
    Body,
    /// A request header.
    Header,
}

/// Declared type of a handler parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    Int,
    Float,
    Bool,
    String,
    /// Any JSON value, bound as-is.
    Json,
}

/// A parameter declared by a handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub source: BindingSource,
    pub kind: ParameterKind,
    #[serde(default)]
    pub required: bool,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, source: BindingSource, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            source,
            kind,
            required: false,
        }
    }

    /// Mark the parameter as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// An application handler that can be invoked with bound arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    /// Fully qualified type implementing the handler group.
    pub handler_type: String,
    /// Handler group (controller) name.
    pub group_name: String,
    /// Handler (action) name within the group.
    pub handler_name: String,
    /// Declared parameters, in declaration order.
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
}

impl ActionDescriptor {
    pub fn new(
        handler_type: impl Into<String>,
        group_name: impl Into<String>,
        handler_name: impl Into<String>,
    ) -> Self {
        Self {
            handler_type: handler_type.into(),
            group_name: group_name.into(),
            handler_name: handler_name.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Declared parameter names in declaration order.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.name.as_str())
    }
}

/// What handler selection resolved a route to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HandlerDescriptor {
    /// A named, invocable application handler.
    Action(ActionDescriptor),
    /// A static file served from disk.
    StaticFile { path: String },
    /// A redirect to another location.
    Redirect { location: String },
    /// A built-in handler owned by the host framework.
    System { name: String },
}

impl HandlerDescriptor {
    /// Short name of the descriptor kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            HandlerDescriptor::Action(_) => "action",
            HandlerDescriptor::StaticFile { .. } => "static file",
            HandlerDescriptor::Redirect { .. } => "redirect",
            HandlerDescriptor::System { .. } => "system handler",
        }
    }

    pub fn as_action(&self) -> Option<&ActionDescriptor> {
        match self {
            HandlerDescriptor::Action(action) => Some(action),
            _ => None,
        }
    }
}

impl std::fmt::Display for HandlerDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerDescriptor::Action(a) => write!(f, "{}.{}", a.group_name, a.handler_name),
            HandlerDescriptor::StaticFile { path } => write!(f, "static file '{}'", path),
            HandlerDescriptor::Redirect { location } => write!(f, "redirect to '{}'", location),
            HandlerDescriptor::System { name } => write!(f, "system handler '{}'", name),
        }
    }
}
