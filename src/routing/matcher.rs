//! Route conditions.
//!
//! A compiled route is an [`AndMatcher`] over method, template and
//! (optionally) host conditions. Captured route values only reach the caller
//! when every condition holds.
//!
//! Host comparison ignores ASCII case and any port; path literals are
//! compared exactly. An empty method list accepts every method.

use axum::http::Method;

use crate::http::SyntheticRequest;
use crate::pipeline::RouteValues;
use crate::routing::template::PathTemplate;

/// A single routing condition.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition. Captured route
    /// values are written into `values`.
    fn matches(&self, req: &SyntheticRequest, values: &mut RouteValues) -> bool;
}

/// `Host` header condition.
#[derive(Debug, Clone)]
pub struct HostMatcher {
    host: String,
}

impl HostMatcher {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }
}

impl Matcher for HostMatcher {
    fn matches(&self, req: &SyntheticRequest, _: &mut RouteValues) -> bool {
        let Some(header) = req.header("host") else {
            return false;
        };
        strip_port(header).eq_ignore_ascii_case(strip_port(&self.host))
    }
}

/// Host without a trailing `:port`. Bracketed IPv6 literals keep their colons.
fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port))
            if !port.is_empty()
                && port.bytes().all(|b| b.is_ascii_digit())
                && (name.ends_with(']') || !name.contains(':')) =>
        {
            name
        }
        _ => host,
    }
}

/// Matches any of a set of methods.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    methods: Vec<Method>,
}

impl MethodMatcher {
    pub fn new(methods: Vec<Method>) -> Self {
        Self { methods }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &SyntheticRequest, _: &mut RouteValues) -> bool {
        self.methods.is_empty() || self.methods.contains(req.method())
    }
}

/// Matches the request path against a template.
#[derive(Debug, Clone)]
pub struct TemplateMatcher {
    template: PathTemplate,
}

impl TemplateMatcher {
    pub fn new(template: PathTemplate) -> Self {
        Self { template }
    }
}

impl Matcher for TemplateMatcher {
    fn matches(&self, req: &SyntheticRequest, values: &mut RouteValues) -> bool {
        match self.template.match_path(req.path()) {
            Some(captured) => {
                values.extend(captured);
                true
            }
            None => false,
        }
    }
}

/// All conditions must hold.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, req: &SyntheticRequest, values: &mut RouteValues) -> bool {
        // Captures only land in `values` if every matcher passes.
        let mut captured = RouteValues::new();
        if self.matchers.iter().all(|m| m.matches(req, &mut captured)) {
            values.extend(captured);
            true
        } else {
            false
        }
    }
}
