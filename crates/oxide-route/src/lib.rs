//! # oxide-route
//!
//! Route compilation and request binding for an embedded REST server.
//!
//! This crate provides:
//! - URI templates with `{name}` placeholders compiled to anchored regexes
//! - HTTP verb resolution from a handler's declared return type
//! - Typed binding of captured path text into scalar and list values
//! - Immutable per-handler route descriptors, safe to match concurrently
//! - JSON route manifests
//!
//! Holding many descriptors and choosing between them is left to the
//! dispatcher that embeds this crate.
//!
//! ## Quick Start
//!
//! ```
//! use oxide_route::{ParamType, RouteDescriptor, ScalarType, Value, Verb};
//!
//! let route = RouteDescriptor::builder("items.show", "/items/{ids}")
//!     .prefix("api")
//!     .param("ids", ParamType::sequence_of(ScalarType::Int32))
//!     .verb(Verb::Get)
//!     .build()
//!     .unwrap();
//!
//! assert!(route.is_match("/api/items/1;2;3"));
//! assert_eq!(
//!     route.extract_parameters("/api/items/1;2;3").unwrap(),
//!     vec![Value::from(vec![1, 2, 3])]
//! );
//! ```
//!
//! ## Multi-valued parameters
//!
//! A list parameter is written as `;`-separated elements in a single path
//! segment. Text elements are percent-decoded individually, so `a%2Fb;c`
//! binds to `["a/b", "c"]`. Scalar text is bound verbatim.
//!
//! ## Verbs
//!
//! A handler's verb comes from the markers on its declared return type,
//! after unwrapping any future:
//!
//! ```
//! use oxide_route::{ReturnType, RouteDescriptor, Verb};
//!
//! let route = RouteDescriptor::builder("users.create", "/users")
//!     .returns(ReturnType::future(ReturnType::with_verb("Created", Verb::Post)))
//!     .build()
//!     .unwrap();
//! assert_eq!(route.verb(), Verb::Post);
//! ```

mod binder;
mod descriptor;
mod error;
mod manifest;
mod template;
mod types;
mod value;
mod verb;

pub use binder::{bind, parser_for, ScalarParser, SEQUENCE_SEPARATOR};
pub use descriptor::{Parameter, ParameterSource, RouteBuilder, RouteDescriptor};
pub use error::{BindError, Result, RouteError, TemplateError};
pub use manifest::{RouteDeclaration, RouteManifest};
pub use template::{normalize_path, normalize_template, CompileOptions, TemplateToken, UriTemplate};
pub use types::{ParamType, ScalarType};
pub use value::Value;
pub use verb::{resolve as resolve_verb, ReturnType, Verb};
