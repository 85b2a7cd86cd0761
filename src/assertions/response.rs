//! Fluent checks over a captured [`ProducedResponse`].
//!
//! # Responsibilities
//! - Status, body (raw, text, JSON, typed) and content metadata
//! - Headers by name, value and full value list
//! - `Set-Cookie` values and attributes
//!
//! # Design Decisions
//! - Header names compare case-insensitively, values exactly
//! - JSON bodies compare as values (whitespace and key order are ignored)
//! - Media types compare case-insensitively; parameters only when the
//!   expected value names them

use std::collections::BTreeMap;
use std::fmt::Debug;

use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::assertions::error::{ensure_eq, AssertionError, AssertionResult};
use crate::http::{CookieOptions, ProducedResponse, ResponseCookie};

/// Start checking a response.
pub fn assert_response(response: &ProducedResponse) -> ResponseAssertions<'_> {
    ResponseAssertions::new(response)
}

#[derive(Debug, Clone, Copy)]
pub struct ResponseAssertions<'a> {
    response: &'a ProducedResponse,
}

impl<'a> ResponseAssertions<'a> {
    pub fn new(response: &'a ProducedResponse) -> Self {
        Self { response }
    }

    pub fn response(&self) -> &'a ProducedResponse {
        self.response
    }

    pub fn with_status_code(self, code: impl Into<u16>) -> AssertionResult<Self> {
        ensure_eq("status code", code.into(), self.response.status().as_u16())?;
        Ok(self)
    }

    pub fn with_body(self, expected: impl AsRef<[u8]>) -> AssertionResult<Self> {
        let expected = expected.as_ref();
        if expected == self.response.body().as_ref() {
            return Ok(self);
        }
        Err(AssertionError::new(format!(
            "expected body to be {:?}, but it was {:?}",
            String::from_utf8_lossy(expected),
            String::from_utf8_lossy(self.response.body())
        )))
    }

    /// Text body equal to `expected`; a content type, if present, must be text/plain.
    pub fn with_string_body(self, expected: &str) -> AssertionResult<Self> {
        if let Some(content_type) = self.content_type() {
            if !media_type_matches("text/plain", content_type) {
                return Err(AssertionError::mismatch(
                    "content type",
                    "text/plain",
                    content_type,
                ));
            }
        }
        ensure_eq("body", expected, self.text()?)?;
        Ok(self)
    }

    /// JSON body semantically equal to `expected`.
    pub fn with_json_body(self, expected: &str) -> AssertionResult<Self> {
        let expected: Value = serde_json::from_str(expected).map_err(|e| {
            AssertionError::new(format!("expected body is not valid JSON: {e}"))
        })?;
        self.check_json(&expected)?;
        Ok(self)
    }

    pub fn with_json_body_value<T: Serialize>(self, expected: T) -> AssertionResult<Self> {
        let expected = serde_json::to_value(expected).map_err(|e| {
            AssertionError::new(format!("expected body is not serializable: {e}"))
        })?;
        self.check_json(&expected)?;
        Ok(self)
    }

    /// Body has the given content type and, read as JSON, equals `expected`.
    ///
    /// Unlike [`with_json_body_value`](Self::with_json_body_value) the media
    /// type is the caller's, e.g. `application/problem+json`.
    pub fn with_body_value<T: Serialize>(
        self,
        expected: T,
        content_type: &str,
    ) -> AssertionResult<Self> {
        self.with_content_type(content_type)?;
        let expected = serde_json::to_value(expected).map_err(|e| {
            AssertionError::new(format!("expected body is not serializable: {e}"))
        })?;
        self.compare_json(&expected)?;
        Ok(self)
    }

    /// Body has the given content type and deserializes as `T`.
    pub fn with_body_of_type<T: DeserializeOwned>(self, content_type: &str) -> AssertionResult<Self> {
        self.with_content_type(content_type)?;
        serde_json::from_slice::<T>(self.response.body()).map_err(|e| {
            AssertionError::new(format!(
                "expected body to be a {}, but it could not be read as one: {e}",
                std::any::type_name::<T>()
            ))
        })?;
        Ok(self)
    }

    /// `None` expects no `Content-Length` header.
    pub fn with_content_length(self, expected: Option<u64>) -> AssertionResult<Self> {
        let actual = match self.response.headers().get(CONTENT_LENGTH) {
            None => None,
            Some(v) => Some(
                v.to_str()
                    .ok()
                    .and_then(|s| s.trim().parse::<u64>().ok())
                    .ok_or_else(|| {
                        AssertionError::new(format!("content length {v:?} is not a number"))
                    })?,
            ),
        };
        ensure_eq("content length", expected, actual)?;
        Ok(self)
    }

    pub fn with_content_type(self, expected: &str) -> AssertionResult<Self> {
        match self.content_type() {
            Some(actual) if media_type_matches(expected, actual) => Ok(self),
            actual => Err(AssertionError::mismatch("content type", Some(expected), actual)),
        }
    }

    pub fn containing_header(self, name: &str) -> AssertionResult<Self> {
        if self.response.headers().contains_key(name) {
            return Ok(self);
        }
        Err(AssertionError::new(format!(
            "expected header '{name}' to be present, but the headers were {:?}",
            self.response.headers().keys().map(|k| k.as_str()).collect::<Vec<_>>()
        )))
    }

    /// Any value of the header equals `value`.
    pub fn containing_header_value(self, name: &str, value: &str) -> AssertionResult<Self> {
        let values = self.response.header_values(name);
        if values.contains(&value) {
            return Ok(self);
        }
        Err(AssertionError::new(format!(
            "expected header '{name}' to contain {value:?}, but its values were {values:?}"
        )))
    }

    /// The header's values are exactly `expected`, in order.
    pub fn containing_header_values<S: AsRef<str>>(
        self,
        name: &str,
        expected: &[S],
    ) -> AssertionResult<Self> {
        let expected: Vec<&str> = expected.iter().map(AsRef::as_ref).collect();
        ensure_eq(
            &format!("header '{name}'"),
            expected,
            self.response.header_values(name),
        )?;
        Ok(self)
    }

    pub fn containing_headers<K, V>(self, expected: &BTreeMap<K, V>) -> AssertionResult<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, value) in expected {
            self.containing_header_value(name.as_ref(), value.as_ref())?;
        }
        Ok(self)
    }

    pub fn containing_cookie(self, name: &str) -> AssertionResult<Self> {
        self.cookie(name)?;
        Ok(self)
    }

    pub fn containing_cookie_value(self, name: &str, value: &str) -> AssertionResult<Self> {
        let cookie = self.cookie(name)?;
        ensure_eq(&format!("cookie '{name}'"), value, cookie.value.as_str())?;
        Ok(self)
    }

    /// Cookie value plus every attribute set in `options`.
    pub fn containing_cookie_with(
        self,
        name: &str,
        value: &str,
        options: &CookieOptions,
    ) -> AssertionResult<Self> {
        let cookie = self.cookie(name)?;
        ensure_eq(&format!("cookie '{name}'"), value, cookie.value.as_str())?;
        let mismatched = cookie.options.mismatches(options);
        if mismatched.is_empty() {
            return Ok(self);
        }
        Err(AssertionError::new(format!(
            "expected cookie '{name}' to have attributes {options:?}, but {mismatched:?} \
             differed in {:?}",
            cookie.options
        )))
    }

    pub fn containing_cookies<K, V>(self, expected: &BTreeMap<K, V>) -> AssertionResult<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, value) in expected {
            self.containing_cookie_value(name.as_ref(), value.as_ref())?;
        }
        Ok(self)
    }

    fn content_type(&self) -> Option<&'a str> {
        self.response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    fn text(&self) -> AssertionResult<&'a str> {
        self.response
            .body_text()
            .map_err(|e| AssertionError::new(format!("expected a UTF-8 body: {e}")))
    }

    fn check_json(&self, expected: &Value) -> AssertionResult<()> {
        if let Some(content_type) = self.content_type() {
            if !is_json_media_type(content_type) {
                return Err(AssertionError::mismatch(
                    "content type",
                    "application/json",
                    content_type,
                ));
            }
        }
        self.compare_json(expected)
    }

    fn compare_json(&self, expected: &Value) -> AssertionResult<()> {
        let actual: Value = serde_json::from_slice(self.response.body()).map_err(|e| {
            AssertionError::new(format!(
                "expected a JSON body, but {:?} is not valid JSON: {e}",
                String::from_utf8_lossy(self.response.body())
            ))
        })?;
        if &actual == expected {
            return Ok(());
        }
        Err(AssertionError::new(format!(
            "expected body to be {expected}, but it was {actual}"
        )))
    }

    fn cookie(&self, name: &str) -> AssertionResult<ResponseCookie> {
        self.response.cookie(name).ok_or_else(|| {
            AssertionError::new(format!(
                "expected cookie '{name}' to be set, but the cookies were {:?}",
                self.response
                    .cookies()
                    .iter()
                    .map(|c| c.name.clone())
                    .collect::<Vec<_>>()
            ))
        })
    }
}

/// Split "type/subtype; k=v" into the lowercased media type and its parameters.
fn split_media_type(value: &str) -> (String, Vec<String>) {
    let mut parts = value.split(';');
    let media = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
    let params = parts
        .map(|p| p.trim().to_ascii_lowercase().replace(' ', ""))
        .filter(|p| !p.is_empty())
        .collect();
    (media, params)
}

fn media_type_matches(expected: &str, actual: &str) -> bool {
    let (expected_media, expected_params) = split_media_type(expected);
    let (actual_media, actual_params) = split_media_type(actual);
    expected_media == actual_media && expected_params.iter().all(|p| actual_params.contains(p))
}

fn is_json_media_type(value: &str) -> bool {
    let (media, _) = split_media_type(value);
    media == "application/json" || media.ends_with("+json")
}
