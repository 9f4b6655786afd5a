//! Route descriptors: the compiled, immutable state of one handler.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, trace};

use crate::binder;
use crate::error::{BindError, Result, RouteError};
use crate::template::{CompileOptions, UriTemplate};
use crate::types::ParamType;
use crate::value::Value;
use crate::verb::{self, ReturnType, Verb};

/// Where a parameter's value comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterSource {
    /// Captured from a URI placeholder of the same name.
    #[default]
    Path,
    /// Deserialized from the request body.
    Content,
}

/// A declared handler parameter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Parameter {
    /// Parameter name; for path parameters, the placeholder name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub ty: ParamType,
    /// Where the value comes from.
    #[serde(default)]
    pub source: ParameterSource,
}

impl Parameter {
    /// Creates a parameter bound from the URI.
    pub fn path(name: impl Into<String>, ty: impl Into<ParamType>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            source: ParameterSource::Path,
        }
    }

    /// Creates a parameter bound from the request body.
    pub fn content(name: impl Into<String>, ty: impl Into<ParamType>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            source: ParameterSource::Content,
        }
    }
}

/// Collects a handler declaration and compiles it into a [`RouteDescriptor`].
#[derive(Debug, Clone)]
pub struct RouteBuilder {
    handler: String,
    template: String,
    prefix: Option<String>,
    parameters: Vec<Parameter>,
    returns: Option<ReturnType>,
    options: CompileOptions,
}

impl RouteBuilder {
    /// Starts a declaration for `handler` served at `template`.
    pub fn new(handler: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            handler: handler.into(),
            template: template.into(),
            prefix: None,
            parameters: Vec::new(),
            returns: None,
            options: CompileOptions::default(),
        }
    }

    /// Sets the path prefix the template is joined under.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Adds a parameter bound from the URI.
    #[must_use]
    pub fn param(self, name: impl Into<String>, ty: impl Into<ParamType>) -> Self {
        self.parameter(Parameter::path(name, ty))
    }

    /// Adds the parameter bound from the request body.
    #[must_use]
    pub fn content(self, name: impl Into<String>, ty: impl Into<ParamType>) -> Self {
        self.parameter(Parameter::content(name, ty))
    }

    /// Adds a parameter declaration.
    #[must_use]
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Sets the handler's declared return type.
    #[must_use]
    pub fn returns(mut self, returns: ReturnType) -> Self {
        self.returns = Some(returns);
        self
    }

    /// Tags the handler with a verb directly.
    #[must_use]
    pub fn verb(mut self, verb: Verb) -> Self {
        self.returns = Some(ReturnType::with_verb(self.handler.clone(), verb));
        self
    }

    /// Sets the compile options.
    #[must_use]
    pub fn options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Validates the declaration and compiles it.
    pub fn build(self) -> Result<RouteDescriptor> {
        let handler = self.handler;

        let mut names = HashSet::new();
        let mut path_parameters = Vec::new();
        let mut body_parameter: Option<Parameter> = None;

        for parameter in self.parameters {
            if !names.insert(parameter.name.clone()) {
                return Err(RouteError::DuplicateParameter {
                    handler,
                    name: parameter.name,
                });
            }

            match parameter.source {
                ParameterSource::Content => {
                    if let Some(first) = &body_parameter {
                        return Err(RouteError::MultipleContentParameters {
                            handler,
                            first: first.name.clone(),
                            second: parameter.name,
                        });
                    }
                    body_parameter = Some(parameter);
                }
                ParameterSource::Path => {
                    if !parameter.ty.is_valid() {
                        return Err(RouteError::InvalidParameterType {
                            handler,
                            name: parameter.name,
                            ty: parameter.ty,
                        });
                    }
                    path_parameters.push(parameter);
                }
            }
        }

        let template =
            match UriTemplate::compile(&self.template, self.prefix.as_deref(), self.options) {
                Ok(template) => template,
                Err(source) => {
                    return Err(RouteError::InvalidTemplate {
                        handler,
                        template: self.template,
                        source,
                    })
                }
            };

        let placeholders: HashSet<&str> =
            template.placeholders().iter().map(String::as_str).collect();

        if let Some(body) = &body_parameter {
            if placeholders.contains(body.name.as_str()) {
                return Err(RouteError::ContentParameterInTemplate {
                    handler,
                    name: body.name.clone(),
                });
            }
        }

        for name in template.placeholders() {
            if !path_parameters.iter().any(|p| &p.name == name) {
                return Err(RouteError::MissingParameter {
                    handler,
                    name: name.clone(),
                });
            }
        }

        if let Some(orphan) = path_parameters
            .iter()
            .find(|p| !placeholders.contains(p.name.as_str()))
        {
            return Err(RouteError::OrphanParameter {
                handler,
                name: orphan.name.clone(),
            });
        }

        let verb = match &self.returns {
            Some(returns) => verb::resolve(&handler, returns)?,
            None => {
                return Err(RouteError::UnresolvableVerb {
                    handler,
                    type_name: "()".to_string(),
                })
            }
        };

        debug!(
            handler = %handler,
            %verb,
            template = template.as_str(),
            matcher = template.matcher().as_str(),
            extractor = template.extractor().as_str(),
            "compiled route"
        );

        Ok(RouteDescriptor {
            handler,
            verb,
            template,
            path_parameters,
            body_parameter,
        })
    }
}

/// The compiled, immutable description of one handler's route.
///
/// A descriptor is built once and then only read, so it can be shared
/// across threads (for example behind an `Arc`) and matched concurrently.
///
/// # Example
///
/// ```
/// use oxide_route::{RouteDescriptor, ScalarType, Value, Verb};
///
/// let route = RouteDescriptor::builder("users.show", "/users/{id}")
///     .param("id", ScalarType::Int32)
///     .verb(Verb::Get)
///     .build()
///     .unwrap();
///
/// assert!(route.is_match("/users/42"));
/// assert_eq!(route.extract_parameters("/users/42").unwrap(), vec![Value::Int32(42)]);
/// ```
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    handler: String,
    verb: Verb,
    template: UriTemplate,
    path_parameters: Vec<Parameter>,
    body_parameter: Option<Parameter>,
}

impl RouteDescriptor {
    /// Starts building a descriptor.
    pub fn builder(handler: impl Into<String>, template: impl Into<String>) -> RouteBuilder {
        RouteBuilder::new(handler, template)
    }

    /// Returns true if the URI has the shape of this route.
    #[must_use]
    pub fn is_match(&self, uri: &str) -> bool {
        let matched = self.template.is_match(uri);
        trace!(handler = %self.handler, uri, matched, "route match");
        matched
    }

    /// Binds the path parameters from a URI, in declaration order.
    ///
    /// The URI must already have passed [`is_match`](Self::is_match);
    /// otherwise this returns [`BindError::NoMatch`].
    pub fn extract_parameters(&self, uri: &str) -> std::result::Result<Vec<Value>, BindError> {
        binder::extract(&self.template, &self.path_parameters, uri)
    }

    /// Generates a URI for this route from path parameter values given in
    /// declaration order.
    pub fn build_uri(&self, values: &[Value]) -> std::result::Result<String, BindError> {
        binder::expand(&self.template, &self.path_parameters, values)
    }

    /// Returns the handler name.
    #[must_use]
    pub fn handler(&self) -> &str {
        &self.handler
    }

    /// Returns the verb this route serves.
    #[must_use]
    pub const fn verb(&self) -> Verb {
        self.verb
    }

    /// Returns the normalized URI template.
    #[must_use]
    pub fn uri_template(&self) -> &str {
        self.template.as_str()
    }

    /// Returns the compiled template.
    #[must_use]
    pub const fn template(&self) -> &UriTemplate {
        &self.template
    }

    /// Returns the matcher pattern source.
    #[must_use]
    pub fn matcher_pattern(&self) -> &str {
        self.template.matcher().as_str()
    }

    /// Returns the extractor pattern source.
    #[must_use]
    pub fn extractor_pattern(&self) -> &str {
        self.template.extractor().as_str()
    }

    /// Returns the path parameters in declaration order.
    #[must_use]
    pub fn path_parameters(&self) -> &[Parameter] {
        &self.path_parameters
    }

    /// Returns true if one parameter is bound from the request body.
    #[must_use]
    pub const fn has_body_parameter(&self) -> bool {
        self.body_parameter.is_some()
    }

    /// Returns the body parameter, if any.
    #[must_use]
    pub const fn body_parameter(&self) -> Option<&Parameter> {
        self.body_parameter.as_ref()
    }

    /// Returns the type of the body parameter, if any.
    #[must_use]
    pub fn body_parameter_type(&self) -> Option<&ParamType> {
        self.body_parameter.as_ref().map(|p| &p.ty)
    }
}
