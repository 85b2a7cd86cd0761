//! Synthetic request construction.
//!
//! # Responsibilities
//! - Describe an inbound request (method, path, query, headers, body)
//! - Seed route values ahead of route matching
//! - Convert into an `axum::http::Request` for response capture
//!
//! # Design Decisions
//! - Immutable once built; the resolution engine only reads it
//! - Builder collects the first error and reports it from `build()`
//! - Default headers from config never override explicit ones

use axum::body::{Body, Bytes};
use axum::http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use axum::http::{HeaderMap, Method, Request};
use serde::Serialize;
use thiserror::Error;

use crate::config::RequestDefaults;
use crate::pipeline::RouteValues;

/// Errors raised while building a synthetic request.
#[derive(Debug, Error)]
pub enum RequestBuildError {
    #[error("request path must start with '/': '{0}'")]
    InvalidPath(String),

    #[error("invalid header name: '{0}'")]
    InvalidHeaderName(String),

    #[error("invalid value for header '{0}'")]
    InvalidHeaderValue(String),

    #[error("failed to serialize JSON body: {0}")]
    Body(#[from] serde_json::Error),

    #[error("failed to build HTTP request: {0}")]
    Http(#[from] axum::http::Error),
}

/// A request described by a test, ready to be resolved or dispatched.
#[derive(Debug, Clone)]
pub struct SyntheticRequest {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
    route_values: RouteValues,
}

impl SyntheticRequest {
    pub fn builder() -> SyntheticRequestBuilder {
        SyntheticRequestBuilder::default()
    }

    /// Shorthand for a bodiless GET.
    pub fn get(path: &str) -> Result<Self, RequestBuildError> {
        Self::builder().method(Method::GET).path(path).build()
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request path without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string, without the leading `?`.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Decoded query parameters in order of appearance.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .as_deref()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First decoded value of a query parameter.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query_pairs()
            .into_iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as a string, if present and visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Route values seeded before matching.
    pub fn route_values(&self) -> &RouteValues {
        &self.route_values
    }

    /// Path and query as they appear in a request line.
    pub fn path_and_query(&self) -> String {
        match &self.query {
            Some(q) if !q.is_empty() => format!("{}?{}", self.path, q),
            _ => self.path.clone(),
        }
    }

    /// Build an HTTP request for dispatch through a `tower::Service`.
    pub fn to_http_request(&self) -> Result<Request<Body>, RequestBuildError> {
        let mut builder = Request::builder()
            .method(self.method.clone())
            .uri(self.path_and_query());
        if let Some(headers) = builder.headers_mut() {
            headers.extend(self.headers.clone());
        }
        Ok(builder.body(Body::from(self.body.clone()))?)
    }
}

/// Fluent builder for [`SyntheticRequest`].
#[derive(Debug, Default)]
pub struct SyntheticRequestBuilder {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
    route_values: RouteValues,
    error: Option<RequestBuildError>,
}

impl SyntheticRequestBuilder {
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the path. A `?query` suffix is split off into query parameters.
    pub fn path(mut self, path: &str) -> Self {
        match path.split_once('?') {
            Some((p, q)) => {
                self.path = p.to_string();
                self.query
                    .extend(url::form_urlencoded::parse(q.as_bytes()).into_owned());
            }
            None => self.path = path.to_string(),
        }
        self
    }

    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Append a header. Repeated names keep every value.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        let header_name = match HeaderName::from_bytes(name.as_bytes()) {
            Ok(n) => n,
            Err(_) => {
                self.error = Some(RequestBuildError::InvalidHeaderName(name.to_string()));
                return self;
            }
        };
        match HeaderValue::from_str(value) {
            Ok(v) => {
                self.headers.append(header_name, v);
            }
            Err(_) => {
                self.error = Some(RequestBuildError::InvalidHeaderValue(name.to_string()));
            }
        }
        self
    }

    pub fn content_type(self, content_type: &str) -> Self {
        self.header(CONTENT_TYPE.as_str(), content_type)
    }

    /// Raw body bytes; content type is left to the caller.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// UTF-8 text body, `text/plain` unless a content type is already set.
    pub fn text_body(mut self, body: impl Into<String>) -> Self {
        self.body = Bytes::from(body.into());
        self.default_content_type("text/plain; charset=utf-8")
    }

    /// JSON body, `application/json` unless a content type is already set.
    pub fn json_body<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        match serde_json::to_vec(body) {
            Ok(bytes) => self.body = Bytes::from(bytes),
            Err(e) => {
                if self.error.is_none() {
                    self.error = Some(RequestBuildError::Body(e));
                }
                return self;
            }
        }
        self.default_content_type("application/json")
    }

    /// Seed a route value ahead of matching.
    pub fn route_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.route_values.insert(name.into(), value.into());
        self
    }

    /// Apply configured default headers that are not already set.
    pub fn with_defaults(mut self, defaults: &RequestDefaults) -> Self {
        for (name, value) in &defaults.headers {
            if self.headers.contains_key(name.as_str()) {
                continue;
            }
            self = self.header(name, value);
        }
        self
    }

    pub fn build(self) -> Result<SyntheticRequest, RequestBuildError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let path = if self.path.is_empty() {
            "/".to_string()
        } else {
            self.path
        };
        if !path.starts_with('/') {
            return Err(RequestBuildError::InvalidPath(path));
        }
        let query = if self.query.is_empty() {
            None
        } else {
            Some(
                url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(&self.query)
                    .finish(),
            )
        };

        Ok(SyntheticRequest {
            method: self.method,
            path,
            query,
            headers: self.headers,
            body: self.body,
            route_values: self.route_values,
        })
    }

    fn default_content_type(mut self, content_type: &'static str) -> Self {
        if !self.headers.contains_key(CONTENT_TYPE) {
            self.headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        self
    }
}
