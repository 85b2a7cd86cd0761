//! Response capture and assertions against an axum application.

use std::collections::BTreeMap;

use axum::extract::Path;
use axum::http::header::{CONTENT_TYPE, SET_COOKIE};
use axum::http::{Method, StatusCode};
use axum::response::{AppendHeaders, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use route_probe::config::RuntimeConfig;
use route_probe::http::{capture_response, CookieOptions, SameSite};
use route_probe::{assert_response, ResponseCapture, SyntheticRequest};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Item {
    id: u64,
    name: String,
}

fn app() -> Router {
    Router::new()
        .route(
            "/items/{id}",
            get(|Path(id): Path<u64>| async move {
                Json(Item {
                    id,
                    name: "lamp".into(),
                })
            }),
        )
        .route(
            "/items",
            post(|Json(body): Json<serde_json::Value>| async move {
                (StatusCode::CREATED, Json(body))
            }),
        )
        .route(
            "/login",
            post(|| async {
                (
                    AppendHeaders([
                        (SET_COOKIE, "session=abc; Path=/; HttpOnly; SameSite=Strict"),
                        (SET_COOKIE, "theme=dark; Max-Age=3600"),
                    ]),
                    "welcome",
                )
                    .into_response()
            }),
        )
        .route(
            "/health",
            get(|| async { ([(CONTENT_TYPE, "text/plain; charset=utf-8")], "ok") }),
        )
}

#[test]
fn test_blocking_capture_json() {
    let capture = ResponseCapture::new(&RuntimeConfig::default()).unwrap();
    let response = capture
        .capture(app(), &SyntheticRequest::get("/items/7").unwrap())
        .unwrap();

    assert_response(&response)
        .with_status_code(StatusCode::OK)
        .and_then(|a| a.with_content_type("application/json"))
        .and_then(|a| a.with_json_body(r#"{"name": "lamp", "id": 7}"#))
        .and_then(|a| {
            a.with_json_body_value(Item {
                id: 7,
                name: "lamp".into(),
            })
        })
        .and_then(|a| a.with_body_of_type::<Item>("application/json"))
        .unwrap();
}

#[tokio::test]
async fn test_async_capture_posted_json() {
    let request = SyntheticRequest::builder()
        .method(Method::POST)
        .path("/items")
        .json_body(&json!({ "name": "desk" }))
        .build()
        .unwrap();
    let response = capture_response(app(), &request, 1024).await.unwrap();

    assert_response(&response)
        .with_status_code(201u16)
        .and_then(|a| a.with_json_body_value(json!({ "name": "desk" })))
        .unwrap();

    let err = assert_response(&response)
        .with_json_body(r#"{"name": "chair"}"#)
        .unwrap_err();
    assert_eq!(
        err.message(),
        r#"expected body to be {"name":"chair"}, but it was {"name":"desk"}"#
    );
}

#[test]
fn test_cookies_and_text() {
    let capture = ResponseCapture::new(&RuntimeConfig::default()).unwrap();
    let request = SyntheticRequest::builder()
        .method(Method::POST)
        .path("/login")
        .build()
        .unwrap();
    let response = capture.capture(app(), &request).unwrap();

    assert_response(&response)
        .with_string_body("welcome")
        .and_then(|a| a.containing_cookie("theme"))
        .and_then(|a| {
            a.containing_cookie_with(
                "session",
                "abc",
                &CookieOptions::new()
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Strict),
            )
        })
        .and_then(|a| {
            a.containing_cookie_with("theme", "dark", &CookieOptions::new().max_age(3600))
        })
        .and_then(|a| {
            a.containing_cookies(&BTreeMap::from([("session", "abc"), ("theme", "dark")]))
        })
        .unwrap();

    let err = assert_response(&response)
        .containing_cookie_value("session", "xyz")
        .unwrap_err();
    assert_eq!(
        err.message(),
        "expected cookie 'session' to be \"xyz\", but it was \"abc\""
    );
}

#[test]
fn test_headers_and_not_found() {
    let capture = ResponseCapture::new(&RuntimeConfig::default()).unwrap();

    let response = capture
        .capture(app(), &SyntheticRequest::get("/health").unwrap())
        .unwrap();
    assert_response(&response)
        .containing_header("content-type")
        .and_then(|a| a.containing_header_value("content-type", "text/plain; charset=utf-8"))
        .and_then(|a| a.with_content_type("TEXT/PLAIN"))
        .and_then(|a| a.with_string_body("ok"))
        .unwrap();

    let response = capture
        .capture(app(), &SyntheticRequest::get("/missing").unwrap())
        .unwrap();
    assert_response(&response).with_status_code(404u16).unwrap();
    assert!(assert_response(&response).with_status_code(200u16).is_err());
}
