//! Route manifests: handler declarations loaded from JSON.
//!
//! ```json
//! {
//!   "prefix": "api",
//!   "options": { "case_insensitive": false },
//!   "routes": [
//!     {
//!       "handler": "users.show",
//!       "template": "/users/{id}",
//!       "verb": "GET",
//!       "parameters": [{ "name": "id", "type": "int" }]
//!     },
//!     {
//!       "handler": "users.update",
//!       "template": "/users/{id}",
//!       "returns": { "name": "Task", "future_of": { "name": "Updated", "markers": ["PUT"] } },
//!       "parameters": [
//!         { "name": "id", "type": "int" },
//!         { "name": "user", "type": "User", "source": "content" }
//!       ]
//!     }
//!   ]
//! }
//! ```

use serde::Deserialize;
use tracing::info;

use crate::descriptor::{Parameter, RouteBuilder, RouteDescriptor};
use crate::error::{Result, RouteError};
use crate::template::CompileOptions;
use crate::verb::{ReturnType, Verb};

/// A set of route declarations sharing a prefix and compile options.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteManifest {
    /// Prefix applied to every route without its own.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Compile options applied to every route.
    #[serde(default)]
    pub options: CompileOptions,
    /// Route declarations, in registration order.
    #[serde(default)]
    pub routes: Vec<RouteDeclaration>,
}

/// One handler declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteDeclaration {
    /// Handler name.
    pub handler: String,
    /// URI template.
    pub template: String,
    /// Prefix for this route; replaces the manifest prefix.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Parameters in handler order.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Verb tag.
    #[serde(default)]
    pub verb: Option<Verb>,
    /// Declared return type, used when no verb tag is given.
    #[serde(default)]
    pub returns: Option<ReturnType>,
}

impl RouteManifest {
    /// Parses a manifest from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compiles every declaration, stopping at the first invalid route.
    pub fn compile(&self) -> Result<Vec<RouteDescriptor>> {
        let routes = self
            .routes
            .iter()
            .map(|declaration| declaration.compile(self.prefix.as_deref(), self.options))
            .collect::<Result<Vec<_>>>()?;

        info!(routes = routes.len(), "compiled route manifest");
        Ok(routes)
    }
}

impl RouteDeclaration {
    /// Turns the declaration into a builder.
    #[must_use]
    pub fn builder(&self, default_prefix: Option<&str>, options: CompileOptions) -> RouteBuilder {
        let mut builder = RouteBuilder::new(&self.handler, &self.template).options(options);

        if let Some(prefix) = self.prefix.as_deref().or(default_prefix) {
            builder = builder.prefix(prefix);
        }
        for parameter in &self.parameters {
            builder = builder.parameter(parameter.clone());
        }

        match (&self.returns, self.verb) {
            (Some(returns), _) => builder.returns(returns.clone()),
            (None, Some(verb)) => builder.verb(verb),
            (None, None) => builder,
        }
    }

    /// Compiles the declaration. A verb tag that disagrees with the
    /// declared return type is rejected.
    pub fn compile(
        &self,
        default_prefix: Option<&str>,
        options: CompileOptions,
    ) -> Result<RouteDescriptor> {
        let route = self.builder(default_prefix, options).build()?;

        if let (Some(_), Some(tag)) = (&self.returns, self.verb) {
            if tag != route.verb() {
                return Err(RouteError::AmbiguousVerb {
                    handler: self.handler.clone(),
                    type_name: self
                        .returns
                        .as_ref()
                        .map_or_else(String::new, |r| r.name.clone()),
                    verbs: format!("{}, {tag}", route.verb()),
                });
            }
        }

        Ok(route)
    }
}
