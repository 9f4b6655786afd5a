//! URI template compilation.
//!
//! A template such as `/users/{id}/posts/{post}` is compiled into two
//! anchored regexes:
//!
//! - the **matcher**, which only answers whether a path has the right shape,
//! - the **extractor**, which has one named group per placeholder.
//!
//! A placeholder matches one or more characters other than `/`, shortest
//! first. Two placeholders with no literal between them therefore split
//! their text leftmost-shortest: `{a}{b}` against `xyz` gives `a = "x"` and
//! `b = "yz"`.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::error::TemplateError;

/// Pattern a placeholder expands to.
const PLACEHOLDER_PATTERN: &str = "[^/]+?";

/// Options applied when compiling a template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Match literal segments without regard to ASCII case.
    pub case_insensitive: bool,
}

/// A piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateToken {
    /// Literal text, matched exactly.
    Literal(String),
    /// A `{name}` placeholder.
    Placeholder(String),
}

/// A compiled URI template.
#[derive(Debug, Clone)]
pub struct UriTemplate {
    /// The normalized template string.
    template: String,
    /// Parsed tokens.
    tokens: Vec<TemplateToken>,
    /// Placeholder names in template order.
    placeholders: Vec<String>,
    /// Shape-only pattern.
    matcher: Regex,
    /// Pattern with one named group per placeholder.
    extractor: Regex,
}

impl UriTemplate {
    /// Compiles a template, joining it under an optional prefix.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_route::{CompileOptions, UriTemplate};
    ///
    /// let template =
    ///     UriTemplate::compile("/widgets/{id}", Some("api"), CompileOptions::default()).unwrap();
    /// assert_eq!(template.as_str(), "/api/widgets/{id}");
    /// assert!(template.is_match("/api/widgets/7"));
    /// assert!(!template.is_match("/widgets/7"));
    /// ```
    pub fn compile(
        template: &str,
        prefix: Option<&str>,
        options: CompileOptions,
    ) -> Result<Self, TemplateError> {
        let template = normalize_template(template, prefix);
        let tokens = tokenize(&template)?;

        let mut placeholders = Vec::new();
        let mut seen = HashSet::new();
        let mut matcher = String::from("^");
        let mut extractor = String::from("^");

        for token in &tokens {
            match token {
                TemplateToken::Literal(text) => {
                    let escaped = regex::escape(text);
                    matcher.push_str(&escaped);
                    extractor.push_str(&escaped);
                }
                TemplateToken::Placeholder(name) => {
                    if !seen.insert(name.as_str()) {
                        return Err(TemplateError::DuplicatePlaceholder(name.clone()));
                    }
                    placeholders.push(name.clone());
                    matcher.push_str("(?:");
                    matcher.push_str(PLACEHOLDER_PATTERN);
                    matcher.push(')');
                    extractor.push_str(&format!("(?P<{name}>{PLACEHOLDER_PATTERN})"));
                }
            }
        }

        matcher.push('$');
        extractor.push('$');

        let matcher = build_regex(&matcher, options)?;
        let extractor = build_regex(&extractor, options)?;

        Ok(Self {
            template,
            tokens,
            placeholders,
            matcher,
            extractor,
        })
    }

    /// Returns the normalized template string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Returns the parsed tokens.
    #[must_use]
    pub fn tokens(&self) -> &[TemplateToken] {
        &self.tokens
    }

    /// Returns the placeholder names in template order.
    #[must_use]
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Returns the shape-only matcher regex.
    #[must_use]
    pub const fn matcher(&self) -> &Regex {
        &self.matcher
    }

    /// Returns the extractor regex.
    #[must_use]
    pub const fn extractor(&self) -> &Regex {
        &self.extractor
    }

    /// Tests a request URI against the matcher.
    #[must_use]
    pub fn is_match(&self, uri: &str) -> bool {
        self.matcher.is_match(&normalize_path(uri))
    }

    /// Runs the extractor, returning the raw text of each placeholder in
    /// template order, or `None` if the URI does not match.
    #[must_use]
    pub fn captures(&self, uri: &str) -> Option<HashMap<String, String>> {
        let path = normalize_path(uri);
        let caps = self.extractor.captures(&path)?;

        let mut raw = HashMap::with_capacity(self.placeholders.len());
        for name in &self.placeholders {
            let value = caps.name(name)?;
            raw.insert(name.clone(), value.as_str().to_string());
        }

        Some(raw)
    }

    /// Generates a path by substituting already-encoded segment text for
    /// each placeholder. Returns `None` if a placeholder has no value.
    #[must_use]
    pub fn reverse(&self, params: &HashMap<String, String>) -> Option<String> {
        let mut path = String::with_capacity(self.template.len());

        for token in &self.tokens {
            match token {
                TemplateToken::Literal(text) => path.push_str(text),
                TemplateToken::Placeholder(name) => path.push_str(params.get(name)?),
            }
        }

        Some(path)
    }
}

/// Joins a template under an optional prefix and normalizes slashes.
///
/// Leading and trailing slashes are stripped from both parts, which are
/// then joined with `/` and given a single leading slash.
#[must_use]
pub fn normalize_template(template: &str, prefix: Option<&str>) -> String {
    let template = template.trim_matches('/');
    let prefix = prefix.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty());

    match prefix {
        Some(prefix) if template.is_empty() => format!("/{prefix}"),
        Some(prefix) => format!("/{prefix}/{template}"),
        None => format!("/{template}"),
    }
}

/// Reduces a request URI to the relative path the patterns run against.
///
/// Scheme and authority are dropped from absolute URIs, the query string
/// and fragment are removed, trailing slashes are trimmed and a leading
/// slash is ensured.
#[must_use]
pub fn normalize_path(uri: &str) -> Cow<'_, str> {
    let mut path = match uri.find(|c: char| c == '?' || c == '#') {
        Some(end) => &uri[..end],
        None => uri,
    };

    // Absolute only when the scheme separator precedes the first slash.
    if let Some(scheme_end) = path.find("://") {
        if !path[..scheme_end].contains('/') {
            let authority = &path[scheme_end + 3..];
            path = authority.find('/').map_or("", |i| &authority[i..]);
        }
    }

    let path = path.trim_end_matches('/');
    if path.starts_with('/') {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("/{path}"))
    }
}

fn tokenize(template: &str) -> Result<Vec<TemplateToken>, TemplateError> {
    let mut tokens = Vec::new();
    let mut rest = template;
    let mut offset = 0;

    while let Some(brace) = rest.find(|c: char| c == '{' || c == '}') {
        let (literal, after) = rest.split_at(brace);
        if after.starts_with('}') {
            return Err(TemplateError::UnexpectedClose(offset + brace));
        }
        if !literal.is_empty() {
            tokens.push(TemplateToken::Literal(literal.to_string()));
        }

        let close = after
            .find('}')
            .ok_or(TemplateError::UnclosedPlaceholder(offset + brace))?;
        let name = &after[1..close];
        if !is_identifier(name) {
            return Err(TemplateError::InvalidName(name.to_string()));
        }
        tokens.push(TemplateToken::Placeholder(name.to_string()));

        let consumed = brace + close + 1;
        rest = &rest[consumed..];
        offset += consumed;
    }

    if !rest.is_empty() {
        tokens.push(TemplateToken::Literal(rest.to_string()));
    }

    Ok(tokens)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn build_regex(pattern: &str, options: CompileOptions) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(options.case_insensitive)
        .build()
}
