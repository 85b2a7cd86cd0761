//! Route lookup and handler dispatch for the in-memory route table.
//!
//! # Responsibilities
//! - Store compiled routes and the handler table
//! - Look up matching routes for a request
//! - Select a handler, reporting ambiguity as a fault
//! - Bind declared parameters (see `binder.rs`)
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) route scan in priority order (acceptable for test fixtures)
//! - Routes with equal priority that match the same request are ambiguous
//!   unless they point at the same handler
//! - Explicit NoMatch rather than silent default

use std::collections::{BTreeMap, HashMap};

use axum::http::Method;
use futures_util::future::{self, BoxFuture};
use thiserror::Error;

use crate::config::{ProbeConfig, RouteConfig};
use crate::http::SyntheticRequest;
use crate::pipeline::{
    ArgumentBinder, BindingContext, BoundArguments, HandlerDescriptor, HandlerSelector,
    PipelineFault, RouteData, RouteLookup, RouteMatcher, RouteValues, ValidationState,
};
use crate::routing::binder::bind_parameters;
use crate::routing::matcher::{AndMatcher, HostMatcher, Matcher, MethodMatcher, TemplateMatcher};
use crate::routing::template::{PathTemplate, TemplateError};

/// Fault message reported when several routes match with equal priority.
pub const AMBIGUOUS_MATCH: &str = "ambiguous match";

/// Errors raised while compiling a route table.
#[derive(Debug, Error)]
pub enum RouteTableError {
    #[error("route '{route}' has an invalid template: {source}")]
    Template {
        route: String,
        #[source]
        source: TemplateError,
    },

    #[error("route '{route}' has an invalid method: '{method}'")]
    InvalidMethod { route: String, method: String },

    #[error("route '{route}' references unknown handler '{handler}'")]
    UnknownHandler { route: String, handler: String },

    #[error("route '{0}' is defined more than once")]
    DuplicateRoute(String),
}

#[derive(Debug)]
struct CompiledRoute {
    name: String,
    priority: u32,
    matcher: AndMatcher,
    handler: String,
    defaults: RouteValues,
}

/// A declarative, in-memory host pipeline.
///
/// Intended as a test double for fixtures that do not wrap a real host
/// framework.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
    handlers: HashMap<String, HandlerDescriptor>,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// Compile the routes and handlers of a loaded configuration.
    pub fn from_config(config: &ProbeConfig) -> Result<Self, RouteTableError> {
        Self::compile(&config.routes, &config.handlers)
    }

    fn compile(
        routes: &[RouteConfig],
        handlers: &BTreeMap<String, HandlerDescriptor>,
    ) -> Result<Self, RouteTableError> {
        let mut compiled: Vec<CompiledRoute> = Vec::with_capacity(routes.len());
        for route in routes {
            if compiled.iter().any(|c| c.name == route.name) {
                return Err(RouteTableError::DuplicateRoute(route.name.clone()));
            }
            if !handlers.contains_key(&route.handler) {
                return Err(RouteTableError::UnknownHandler {
                    route: route.name.clone(),
                    handler: route.handler.clone(),
                });
            }
            compiled.push(compile_route(route)?);
        }

        // Stable sort keeps declaration order within a priority.
        compiled.sort_by(|a, b| b.priority.cmp(&a.priority));

        tracing::debug!(
            routes = compiled.len(),
            handlers = handlers.len(),
            "Route table compiled"
        );

        Ok(Self {
            routes: compiled,
            handlers: handlers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        })
    }

    /// Matching routes sharing the highest matching priority, with their
    /// route values (defaults, then seeded values, then captures).
    fn candidates(&self, request: &SyntheticRequest) -> Vec<(&CompiledRoute, RouteValues)> {
        let mut out: Vec<(&CompiledRoute, RouteValues)> = Vec::new();
        for route in &self.routes {
            if let Some((first, _)) = out.first() {
                if route.priority < first.priority {
                    break;
                }
            }
            let mut captured = RouteValues::new();
            if route.matcher.matches(request, &mut captured) {
                let mut values = route.defaults.clone();
                values.extend(request.route_values().clone());
                values.extend(captured);
                out.push((route, values));
            }
        }
        out
    }
}

fn compile_route(route: &RouteConfig) -> Result<CompiledRoute, RouteTableError> {
    let template = PathTemplate::parse(&route.template).map_err(|source| RouteTableError::Template {
        route: route.name.clone(),
        source,
    })?;

    let mut methods = Vec::with_capacity(route.methods.len());
    for m in &route.methods {
        let method = Method::from_bytes(m.to_ascii_uppercase().as_bytes()).map_err(|_| {
            RouteTableError::InvalidMethod {
                route: route.name.clone(),
                method: m.clone(),
            }
        })?;
        methods.push(method);
    }

    let mut matchers: Vec<Box<dyn Matcher>> = vec![
        Box::new(MethodMatcher::new(methods)),
        Box::new(TemplateMatcher::new(template)),
    ];
    if let Some(host) = &route.host {
        matchers.push(Box::new(HostMatcher::new(host.clone())));
    }

    Ok(CompiledRoute {
        name: route.name.clone(),
        priority: route.priority,
        matcher: AndMatcher::new(matchers),
        handler: route.handler.clone(),
        defaults: route.defaults.clone(),
    })
}

impl RouteMatcher for RouteTable {
    fn match_route<'a>(&'a self, request: &'a SyntheticRequest) -> BoxFuture<'a, RouteLookup> {
        let lookup = match self.candidates(request).into_iter().next() {
            Some((route, values)) => RouteLookup::Matched(RouteData::named(route.name.clone(), values)),
            None => RouteLookup::NoMatch,
        };
        Box::pin(future::ready(lookup))
    }
}

impl HandlerSelector for RouteTable {
    /// Selects the handler of the matched route. Another route of the same
    /// priority that also matches the request with a different handler
    /// makes the selection ambiguous. Route data without a known route name
    /// falls back to a fresh scan.
    fn select_handler<'a>(
        &'a self,
        request: &'a SyntheticRequest,
        route: &'a RouteData,
    ) -> BoxFuture<'a, Result<Option<HandlerDescriptor>, PipelineFault>> {
        let matched = route
            .route_name
            .as_deref()
            .and_then(|name| self.routes.iter().find(|r| r.name == name));
        let chosen = match matched {
            Some(chosen) => Some(chosen),
            None => self.candidates(request).first().map(|(r, _)| *r),
        };

        let result = match chosen {
            None => Ok(None),
            Some(chosen) => match self.rival(chosen, request) {
                Some(rival) => {
                    tracing::debug!(
                        route = %chosen.name,
                        rival = %rival.name,
                        priority = chosen.priority,
                        "Multiple routes matched with equal priority"
                    );
                    Err(PipelineFault::new(AMBIGUOUS_MATCH))
                }
                None => Ok(self.handlers.get(&chosen.handler).cloned()),
            },
        };
        Box::pin(future::ready(result))
    }
}

impl RouteTable {
    /// A route of the same priority as `chosen`, pointing at another handler,
    /// that also matches the request.
    fn rival(&self, chosen: &CompiledRoute, request: &SyntheticRequest) -> Option<&CompiledRoute> {
        self.routes
            .iter()
            .filter(|r| r.priority == chosen.priority && r.handler != chosen.handler)
            .find(|r| r.matcher.matches(request, &mut RouteValues::new()))
    }
}

impl ArgumentBinder for RouteTable {
    fn bind_arguments<'a>(
        &'a self,
        ctx: BindingContext<'a>,
        validation: &'a mut ValidationState,
    ) -> BoxFuture<'a, Result<BoundArguments, PipelineFault>> {
        Box::pin(future::ready(bind_parameters(ctx, validation)))
    }
}

/// Fluent builder for [`RouteTable`].
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    routes: Vec<RouteConfig>,
    handlers: BTreeMap<String, HandlerDescriptor>,
}

impl RouteTableBuilder {
    pub fn route(mut self, route: RouteConfig) -> Self {
        self.routes.push(route);
        self
    }

    pub fn handler(mut self, key: impl Into<String>, descriptor: HandlerDescriptor) -> Self {
        self.handlers.insert(key.into(), descriptor);
        self
    }

    pub fn build(self) -> Result<RouteTable, RouteTableError> {
        RouteTable::compile(&self.routes, &self.handlers)
    }
}
