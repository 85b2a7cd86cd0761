//! Shared fixtures for integration tests.

#![allow(dead_code)]

use axum::http::Method;
use route_probe::config::RouteConfig;
use route_probe::pipeline::{
    ActionDescriptor, BindingSource, HandlerDescriptor, ParameterDescriptor, ParameterKind,
};
use route_probe::routing::RouteTable;
use route_probe::SyntheticRequest;

pub const ITEMS_HANDLER: &str = "shop::handlers::ItemsHandler";

/// Items routes, an ambiguous pair, and a static file route.
pub fn items_table() -> RouteTable {
    RouteTable::builder()
        .route(RouteConfig::new("items.get", "/items/{id}", "items.get_by_id").method("GET"))
        .route(RouteConfig::new("items.create", "/items", "items.create").method("POST"))
        .route(
            RouteConfig::new("items.search", "/items", "items.search")
                .method("GET")
                .default_value("sort", "name"),
        )
        .route(RouteConfig::new("reports.by_id", "/reports/{id}", "reports.by_id"))
        .route(RouteConfig::new("reports.by_slug", "/reports/{slug}", "reports.by_slug"))
        .route(RouteConfig::new("assets", "/assets/{*file}", "assets"))
        .handler(
            "items.get_by_id",
            HandlerDescriptor::Action(
                ActionDescriptor::new(ITEMS_HANDLER, "Items", "GetById").with_parameter(
                    ParameterDescriptor::new("id", BindingSource::Route, ParameterKind::Int)
                        .required(),
                ),
            ),
        )
        .handler(
            "items.create",
            HandlerDescriptor::Action(
                ActionDescriptor::new(ITEMS_HANDLER, "Items", "Create")
                    .with_parameter(
                        ParameterDescriptor::new("name", BindingSource::Body, ParameterKind::String)
                            .required(),
                    )
                    .with_parameter(ParameterDescriptor::new(
                        "price",
                        BindingSource::Body,
                        ParameterKind::Float,
                    )),
            ),
        )
        .handler(
            "items.search",
            HandlerDescriptor::Action(
                ActionDescriptor::new(ITEMS_HANDLER, "Items", "Search")
                    .with_parameter(ParameterDescriptor::new(
                        "q",
                        BindingSource::Query,
                        ParameterKind::String,
                    ))
                    .with_parameter(ParameterDescriptor::new(
                        "sort",
                        BindingSource::Route,
                        ParameterKind::String,
                    ))
                    .with_parameter(ParameterDescriptor::new(
                        "x-tenant",
                        BindingSource::Header,
                        ParameterKind::String,
                    )),
            ),
        )
        .handler(
            "reports.by_id",
            HandlerDescriptor::Action(ActionDescriptor::new(
                "shop::handlers::ReportsHandler",
                "Reports",
                "ById",
            )),
        )
        .handler(
            "reports.by_slug",
            HandlerDescriptor::Action(ActionDescriptor::new(
                "shop::handlers::ReportsHandler",
                "Reports",
                "BySlug",
            )),
        )
        .handler(
            "assets",
            HandlerDescriptor::StaticFile {
                path: "wwwroot".into(),
            },
        )
        .build()
        .expect("fixture route table is valid")
}

pub fn get(path: &str) -> SyntheticRequest {
    SyntheticRequest::get(path).expect("valid request")
}

pub fn post_json(path: &str, body: &serde_json::Value) -> SyntheticRequest {
    SyntheticRequest::builder()
        .method(Method::POST)
        .path(path)
        .json_body(body)
        .build()
        .expect("valid request")
}
