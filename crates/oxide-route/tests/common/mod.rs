#![allow(dead_code)]

use oxide_route::{BindError, ParamType, RouteDescriptor, Value, Verb};

pub fn route(template: &str, params: &[(&str, ParamType)]) -> RouteDescriptor {
    params
        .iter()
        .fold(RouteDescriptor::builder("test", template), |b, (name, ty)| {
            b.param(*name, ty.clone())
        })
        .verb(Verb::Get)
        .build()
        .unwrap_or_else(|e| panic!("Failed to build route for {template}: {e}"))
}

pub fn extract(route: &RouteDescriptor, uri: &str) -> Vec<Value> {
    assert!(route.is_match(uri), "Expected {uri} to match {}", route.uri_template());
    route
        .extract_parameters(uri)
        .unwrap_or_else(|e| panic!("Failed to extract from {uri}: {e}"))
}

pub fn extract_err(route: &RouteDescriptor, uri: &str) -> BindError {
    route
        .extract_parameters(uri)
        .expect_err(&format!("Expected binding error for: {uri}"))
}
