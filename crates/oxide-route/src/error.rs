//! Error types for route compilation and parameter binding.

use thiserror::Error;

use crate::types::ParamType;

/// Configuration errors raised while a route descriptor is being built.
///
/// A route that fails with one of these must not be registered. Every
/// per-route variant names the offending handler.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The URI template could not be compiled.
    #[error("handler '{handler}': invalid URI template '{template}': {source}")]
    InvalidTemplate {
        handler: String,
        template: String,
        #[source]
        source: TemplateError,
    },

    /// A path parameter has a type that cannot be bound from a URI.
    #[error("handler '{handler}': parameter '{name}' has type {ty}, which cannot be bound from a URI")]
    InvalidParameterType {
        handler: String,
        name: String,
        ty: ParamType,
    },

    /// The declared return type carries none of the verb markers.
    #[error(
        "handler '{handler}': return type '{type_name}' does not declare a verb; expected one of GET, POST, PUT, DELETE"
    )]
    UnresolvableVerb { handler: String, type_name: String },

    /// The declared return type carries more than one verb marker.
    #[error("handler '{handler}': return type '{type_name}' declares several verbs: {verbs}")]
    AmbiguousVerb {
        handler: String,
        type_name: String,
        verbs: String,
    },

    /// A template placeholder has no matching parameter.
    #[error("handler '{handler}': placeholder '{{{name}}}' has no matching parameter")]
    MissingParameter { handler: String, name: String },

    /// A path parameter does not appear in the template.
    #[error("handler '{handler}': parameter '{name}' does not appear in the URI template")]
    OrphanParameter { handler: String, name: String },

    /// Two parameters share the same name.
    #[error("handler '{handler}': parameter '{name}' is declared more than once")]
    DuplicateParameter { handler: String, name: String },

    /// More than one parameter is bound from the request body.
    #[error("handler '{handler}': only one parameter may be bound from content, found '{first}' and '{second}'")]
    MultipleContentParameters {
        handler: String,
        first: String,
        second: String,
    },

    /// The content parameter is also used as a template placeholder.
    #[error("handler '{handler}': content parameter '{name}' cannot appear in the URI template")]
    ContentParameterInTemplate { handler: String, name: String },

    /// A route manifest could not be read.
    #[error("invalid route manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// Reasons a URI template fails to compile.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A `{` without a closing `}`.
    #[error("unclosed placeholder starting at byte {0}")]
    UnclosedPlaceholder(usize),

    /// A `}` without an opening `{`.
    #[error("unexpected '}}' at byte {0}")]
    UnexpectedClose(usize),

    /// A placeholder name that is not an identifier.
    #[error("placeholder name '{0}' is not a valid identifier")]
    InvalidName(String),

    /// The same placeholder appears twice.
    #[error("placeholder '{0}' appears more than once")]
    DuplicatePlaceholder(String),

    /// The generated pattern was rejected by the regex engine.
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

/// Result type alias for route construction.
pub type Result<T> = std::result::Result<T, RouteError>;

/// Request-time errors raised while binding parameters from a URI.
///
/// These are recoverable: a dispatcher turns them into a client-facing
/// "bad request" response instead of failing the worker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// The URI does not satisfy the extractor pattern. Callers must test
    /// `is_match` before extracting.
    #[error("URI '{uri}' does not match template '{template}'")]
    NoMatch { uri: String, template: String },

    /// A captured token could not be converted to its declared type.
    #[error("parameter '{name}': cannot convert '{raw}' to {ty}: {reason}")]
    Conversion {
        name: String,
        ty: ParamType,
        raw: String,
        reason: String,
    },

    /// The number of values passed to URI generation is wrong.
    #[error("expected {expected} parameter values, got {actual}")]
    ValueCount { expected: usize, actual: usize },

    /// A value passed to URI generation has the wrong type.
    #[error("parameter '{name}': expected a value of type {expected}, got {actual}")]
    ValueType {
        name: String,
        expected: ParamType,
        actual: &'static str,
    },

    /// A value cannot be written into a URI path segment.
    #[error("parameter '{name}': value cannot be placed in a URI: {reason}")]
    Unrepresentable { name: String, reason: String },
}

impl BindError {
    /// Returns true if this error should be reported to the client as a
    /// bad request. `NoMatch` is a dispatcher bug, not a client error.
    #[must_use]
    pub const fn is_bad_request(&self) -> bool {
        matches!(self, Self::Conversion { .. })
    }
}
