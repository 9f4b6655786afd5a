//! HTTP verb resolution from a handler's declared return type.

use std::fmt;

use serde::{Deserialize, Deserializer};

use crate::error::{Result, RouteError};

/// HTTP verbs a handler can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// GET method
    Get,
    /// POST method
    Post,
    /// PUT method
    Put,
    /// DELETE method
    Delete,
}

impl Verb {
    /// All verbs, in the order markers are checked.
    pub const ALL: [Self; 4] = [Self::Get, Self::Post, Self::Put, Self::Delete];

    /// Parses a verb from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Returns the verb as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Verb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "unknown verb '{s}', expected one of GET, POST, PUT, DELETE"
            ))
        })
    }
}

/// The declared result type of a handler.
///
/// A result type carries the verb markers it satisfies. A future wrapper
/// carries the type it resolves to in `inner`; its own markers are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReturnType {
    /// Type name, used in diagnostics.
    pub name: String,
    /// Verb markers the type satisfies.
    #[serde(default)]
    pub markers: Vec<Verb>,
    /// The wrapped result type, if this is a future.
    #[serde(default, rename = "future_of")]
    pub inner: Option<Box<ReturnType>>,
}

impl ReturnType {
    /// Creates a result type with no markers.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            markers: Vec::new(),
            inner: None,
        }
    }

    /// Creates a result type carrying a single verb marker.
    pub fn with_verb(name: impl Into<String>, verb: Verb) -> Self {
        Self::named(name).marker(verb)
    }

    /// Wraps a result type in a future.
    #[must_use]
    pub fn future(inner: Self) -> Self {
        Self {
            name: format!("Future<{}>", inner.name),
            markers: Vec::new(),
            inner: Some(Box::new(inner)),
        }
    }

    /// Adds a verb marker.
    #[must_use]
    pub fn marker(mut self, verb: Verb) -> Self {
        self.markers.push(verb);
        self
    }

    /// Returns true if this is a future wrapper.
    #[must_use]
    pub const fn is_future(&self) -> bool {
        self.inner.is_some()
    }

    /// Strips any future wrappers and returns the result type underneath.
    #[must_use]
    pub fn unwrap_future(&self) -> &Self {
        let mut ty = self;
        while let Some(inner) = &ty.inner {
            ty = inner.as_ref();
        }
        ty
    }
}

/// Resolves the verb a handler serves from its declared return type.
///
/// Future wrappers are unwrapped first. The markers are then checked in
/// the order GET, POST, PUT, DELETE. Exactly one distinct marker must be
/// present.
pub fn resolve(handler: &str, returns: &ReturnType) -> Result<Verb> {
    let result = returns.unwrap_future();
    let found: Vec<Verb> = Verb::ALL
        .into_iter()
        .filter(|verb| result.markers.contains(verb))
        .collect();

    match found.as_slice() {
        [verb] => Ok(*verb),
        [] => Err(RouteError::UnresolvableVerb {
            handler: handler.to_string(),
            type_name: result.name.clone(),
        }),
        verbs => Err(RouteError::AmbiguousVerb {
            handler: handler.to_string(),
            type_name: result.name.clone(),
            verbs: verbs
                .iter()
                .map(Verb::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}
