//! Response capture.
//!
//! # Responsibilities
//! - Dispatch a synthetic request through a `tower::Service` (e.g. `axum::Router`)
//! - Buffer the response body so assertions can inspect it more than once
//! - Expose headers and parsed `Set-Cookie` values
//!
//! # Design Decisions
//! - `ProducedResponse` is immutable and owns its body
//! - Blocking capture drives the service on a dedicated runtime

use std::fmt::Display;

use axum::body::{Body, Bytes};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, Request, Response, StatusCode};
use thiserror::Error;
use tokio::runtime::Runtime;
use tower::{Service, ServiceExt};

use crate::config::RuntimeConfig;
use crate::http::cookie::ResponseCookie;
use crate::http::request::{RequestBuildError, SyntheticRequest};

/// Errors raised while capturing a response.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("invalid request: {0}")]
    Request(#[from] RequestBuildError),

    #[error("service failed: {0}")]
    Service(String),

    #[error("failed to read response body: {0}")]
    Body(#[from] axum::Error),

    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// A fully buffered HTTP response.
#[derive(Debug, Clone)]
pub struct ProducedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ProducedResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Buffer an axum response, reading at most `body_limit` bytes.
    pub async fn from_response(
        response: Response<Body>,
        body_limit: usize,
    ) -> Result<Self, CaptureError> {
        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(body, body_limit).await?;
        Ok(Self {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body decoded as UTF-8.
    pub fn body_text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.body)
    }

    /// All values of a header that are visible ASCII, in order.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Cookies set through `Set-Cookie` headers. Malformed entries are skipped.
    pub fn cookies(&self) -> Vec<ResponseCookie> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(ResponseCookie::parse)
            .collect()
    }

    /// Last cookie set with the given name.
    pub fn cookie(&self, name: &str) -> Option<ResponseCookie> {
        self.cookies().into_iter().rev().find(|c| c.name == name)
    }
}

/// Dispatch a request through a service and buffer the response.
pub async fn capture_response<S>(
    service: S,
    request: &SyntheticRequest,
    body_limit: usize,
) -> Result<ProducedResponse, CaptureError>
where
    S: Service<Request<Body>, Response = Response<Body>>,
    S::Error: Display,
{
    let http_request = request.to_http_request()?;
    tracing::debug!(
        method = %request.method(),
        uri = %request.path_and_query(),
        "Dispatching synthetic request"
    );
    let response = service
        .oneshot(http_request)
        .await
        .map_err(|e| CaptureError::Service(e.to_string()))?;
    let produced = ProducedResponse::from_response(response, body_limit).await?;
    tracing::debug!(status = %produced.status(), bytes = produced.body().len(), "Response captured");
    Ok(produced)
}

/// Blocking response capture for synchronous tests.
pub struct ResponseCapture {
    runtime: Runtime,
    body_limit: usize,
}

impl ResponseCapture {
    pub fn new(config: &RuntimeConfig) -> Result<Self, CaptureError> {
        Ok(Self {
            runtime: config.build_runtime()?,
            body_limit: config.body_limit_bytes,
        })
    }

    /// Dispatch and block until the body is buffered.
    ///
    /// Must not be called from within an async context.
    pub fn capture<S>(
        &self,
        service: S,
        request: &SyntheticRequest,
    ) -> Result<ProducedResponse, CaptureError>
    where
        S: Service<Request<Body>, Response = Response<Body>>,
        S::Error: Display,
    {
        self.runtime
            .block_on(capture_response(service, request, self.body_limit))
    }
}
