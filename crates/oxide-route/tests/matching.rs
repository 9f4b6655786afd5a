//! Tests for route shape matching: literals, prefixes, segment counts and
//! request path normalization.

mod common;
use common::*;

use oxide_route::{ParamType, RouteDescriptor, ScalarType, Verb};

#[test]
fn literal_template_matches_only_itself() {
    let r = route("/search", &[]);
    assert!(r.is_match("/search"));
    assert!(r.is_match("/search/"));
    assert!(r.is_match("/search?q=rust"));
    assert!(!r.is_match("/search/more"));
    assert!(!r.is_match("/"));
    assert!(!r.is_match("/searches"));
    assert!(!r.is_match("/api/search"));
}

#[test]
fn root_template() {
    let r = route("/", &[]);
    assert_eq!(r.uri_template(), "/");
    assert!(r.is_match("/"));
    assert!(r.is_match(""));
    assert!(!r.is_match("/x"));
}

#[test]
fn prefix_is_joined() {
    let r = RouteDescriptor::builder("widgets.show", "/widgets/{id}")
        .prefix("api")
        .param("id", ScalarType::Int32)
        .verb(Verb::Get)
        .build()
        .unwrap();

    assert_eq!(r.uri_template(), "/api/widgets/{id}");
    assert!(r.is_match("/api/widgets/7"));
    assert!(!r.is_match("/widgets/7"));
}

#[test]
fn prefix_and_template_slashes_are_normalized() {
    for (prefix, template) in [
        ("api", "widgets"),
        ("/api", "/widgets"),
        ("/api/", "/widgets/"),
        ("api/", "widgets/"),
    ] {
        let r = RouteDescriptor::builder("h", template)
            .prefix(prefix)
            .verb(Verb::Get)
            .build()
            .unwrap();
        assert_eq!(r.uri_template(), "/api/widgets", "{prefix} + {template}");
    }
}

#[test]
fn differing_segment_counts_never_match() {
    let r = route(
        "/users/{id}/posts/{post}",
        &[
            ("id", ScalarType::Int32.into()),
            ("post", ScalarType::Int32.into()),
        ],
    );

    assert!(r.is_match("/users/1/posts/2"));
    for uri in [
        "/users",
        "/users/1",
        "/users/1/posts",
        "/users/1/posts/2/comments",
        "/users/1/extra/posts/2",
        "/users/1/2",
    ] {
        assert!(!r.is_match(uri), "{uri}");
    }
}

#[test]
fn shape_match_ignores_types() {
    let r = route("/users/{id}", &[("id", ScalarType::Int32.into())]);
    assert!(r.is_match("/users/abc"));
}

#[test]
fn metacharacters_in_literals_are_literal() {
    let r = route("/v1.2/files/{name}.json", &[("name", ScalarType::Text.into())]);
    assert!(r.is_match("/v1.2/files/report.json"));
    assert!(!r.is_match("/v1x2/files/report.json"));
    assert!(!r.is_match("/v1.2/files/reportxjson"));
}

#[test]
fn absolute_uris_are_reduced_to_their_path() {
    let r = route("/users/{id}", &[("id", ScalarType::Int32.into())]);
    assert!(r.is_match("http://localhost:8080/users/42"));
    assert!(r.is_match("https://example.com/users/42?expand=true#top"));
}

#[test]
fn urls_in_the_query_do_not_replace_the_path() {
    let r = route("/users/{id}", &[("id", ScalarType::Int32.into())]);
    assert!(r.is_match("users/1?next=http://evil/x"));
    assert!(!r.is_match("http://host?to=/users/5"));
    assert!(!r.is_match("http://host#/users/5"));
}

#[test]
fn compiling_twice_is_idempotent() {
    let params = [("ids", ParamType::sequence_of(ScalarType::Int64))];
    let a = route("/items/{ids}/detail", &params);
    let b = route("/items/{ids}/detail", &params);

    assert_eq!(a.matcher_pattern(), b.matcher_pattern());
    assert_eq!(a.extractor_pattern(), b.extractor_pattern());

    for uri in [
        "/items/1;2/detail",
        "/items/1/detail",
        "/items/x/detail",
        "/items//detail",
        "/items/1;2",
        "/other",
    ] {
        assert_eq!(a.is_match(uri), b.is_match(uri), "{uri}");
        assert_eq!(a.extract_parameters(uri), b.extract_parameters(uri), "{uri}");
    }
}

#[test]
fn matcher_has_no_capture_groups() {
    let r = route(
        "/a/{x}/b/{y}",
        &[("x", ScalarType::Text.into()), ("y", ScalarType::Text.into())],
    );
    assert_eq!(r.template().matcher().captures_len(), 1);
    assert_eq!(r.template().extractor().captures_len(), 3);
}
