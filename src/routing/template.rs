//! Path templates.
//!
//! Syntax: literal segments, `{name}` parameters, a trailing `{name?}`
//! optional parameter, or a trailing `{*name}` catch-all.
//! Literal segments are compared case-sensitively.
//!
//! Request path segments are percent-decoded after splitting on `/`, so an
//! encoded `%2F` stays inside its segment. Invalid UTF-8 decodes lossily.

use std::borrow::Cow;
use std::collections::BTreeSet;

use percent_encoding::percent_decode_str;
use thiserror::Error;

use crate::pipeline::RouteValues;

/// Why a template was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template must start with '/'")]
    MissingLeadingSlash,

    #[error("parameter name is empty")]
    EmptyParameterName,

    #[error("parameter '{0}' appears more than once")]
    DuplicateParameter(String),

    #[error("catch-all parameter '{0}' must be the last segment")]
    CatchAllNotLast(String),

    #[error("required parameter '{0}' follows an optional one")]
    RequiredAfterOptional(String),

    #[error("segment '{0}' has unbalanced braces")]
    InvalidSegment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    OptionalParam(String),
    CatchAll(String),
}

/// A parsed route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        if !template.starts_with('/') {
            return Err(TemplateError::MissingLeadingSlash);
        }

        let raw_segments: Vec<&str> = template.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(raw_segments.len());
        let mut names = BTreeSet::new();
        let mut seen_optional = false;

        for (i, raw) in raw_segments.iter().enumerate() {
            let segment = parse_segment(raw)?;
            match &segment {
                Segment::Literal(_) | Segment::Param(_) if seen_optional => {
                    let name = match &segment {
                        Segment::Param(n) => n.clone(),
                        _ => raw.to_string(),
                    };
                    return Err(TemplateError::RequiredAfterOptional(name));
                }
                Segment::CatchAll(name) if i + 1 != raw_segments.len() => {
                    return Err(TemplateError::CatchAllNotLast(name.clone()));
                }
                Segment::OptionalParam(_) => seen_optional = true,
                _ => {}
            }
            if let Segment::Param(n) | Segment::OptionalParam(n) | Segment::CatchAll(n) = &segment {
                if !names.insert(n.clone()) {
                    return Err(TemplateError::DuplicateParameter(n.clone()));
                }
            }
            segments.push(segment);
        }

        Ok(Self {
            raw: template.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Names of all parameters in the template.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Literal(_) => None,
            Segment::Param(n) | Segment::OptionalParam(n) | Segment::CatchAll(n) => Some(n.as_str()),
        })
    }

    /// Match a request path, returning captured values on success.
    pub fn match_path(&self, path: &str) -> Option<RouteValues> {
        let parts: Vec<Cow<'_, str>> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| percent_decode_str(s).decode_utf8_lossy())
            .collect();
        let mut values = RouteValues::new();
        let mut idx = 0;

        for segment in &self.segments {
            match segment {
                Segment::Literal(lit) => {
                    if parts.get(idx).map(|p| p.as_ref()) != Some(lit.as_str()) {
                        return None;
                    }
                    idx += 1;
                }
                Segment::Param(name) => {
                    let part = parts.get(idx)?;
                    values.insert(name.clone(), part.to_string());
                    idx += 1;
                }
                Segment::OptionalParam(name) => {
                    if let Some(part) = parts.get(idx) {
                        values.insert(name.clone(), part.to_string());
                        idx += 1;
                    }
                }
                Segment::CatchAll(name) => {
                    values.insert(name.clone(), parts[idx.min(parts.len())..].join("/"));
                    idx = parts.len();
                }
            }
        }

        (idx == parts.len()).then_some(values)
    }
}

fn parse_segment(raw: &str) -> Result<Segment, TemplateError> {
    let opens = raw.starts_with('{');
    let closes = raw.ends_with('}');
    if !opens && !closes {
        if raw.contains('{') || raw.contains('}') {
            return Err(TemplateError::InvalidSegment(raw.to_string()));
        }
        return Ok(Segment::Literal(raw.to_string()));
    }
    if !(opens && closes) || raw.len() < 2 {
        return Err(TemplateError::InvalidSegment(raw.to_string()));
    }

    let inner = &raw[1..raw.len() - 1];
    let (segment, name): (fn(String) -> Segment, &str) = if let Some(n) = inner.strip_prefix('*') {
        (Segment::CatchAll, n)
    } else if let Some(n) = inner.strip_suffix('?') {
        (Segment::OptionalParam, n)
    } else {
        (Segment::Param, inner)
    };

    if name.is_empty() {
        return Err(TemplateError::EmptyParameterName);
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(TemplateError::InvalidSegment(raw.to_string()));
    }
    Ok(segment(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> RouteValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_literal_and_param() {
        let t = PathTemplate::parse("/items/{id}").unwrap();
        assert_eq!(t.match_path("/items/42"), Some(values(&[("id", "42")])));
        assert_eq!(t.match_path("/items/42/"), Some(values(&[("id", "42")])));
        assert_eq!(t.match_path("/items"), None);
        assert_eq!(t.match_path("/items/42/extra"), None);
        assert_eq!(t.match_path("/Items/42"), None);
    }

    #[test]
    fn test_optional_param() {
        let t = PathTemplate::parse("/items/{page?}").unwrap();
        assert_eq!(t.match_path("/items"), Some(RouteValues::new()));
        assert_eq!(t.match_path("/items/3"), Some(values(&[("page", "3")])));
    }

    #[test]
    fn test_catch_all() {
        let t = PathTemplate::parse("/files/{*path}").unwrap();
        assert_eq!(
            t.match_path("/files/css/site.css"),
            Some(values(&[("path", "css/site.css")]))
        );
        assert_eq!(t.match_path("/files"), Some(values(&[("path", "")])));
    }

    #[test]
    fn test_segments_are_percent_decoded() {
        let t = PathTemplate::parse("/search/{term}").unwrap();
        assert_eq!(
            t.match_path("/search/red%20lamp"),
            Some(values(&[("term", "red lamp")]))
        );
        assert_eq!(
            t.match_path("/search/a%2Fb"),
            Some(values(&[("term", "a/b")]))
        );

        let t = PathTemplate::parse("/caf\u{e9}/{*rest}").unwrap();
        assert_eq!(
            t.match_path("/caf%C3%A9/my%20docs/read%20me.txt"),
            Some(values(&[("rest", "my docs/read me.txt")]))
        );
    }

    #[test]
    fn test_root() {
        let t = PathTemplate::parse("/").unwrap();
        assert_eq!(t.match_path("/"), Some(RouteValues::new()));
        assert_eq!(t.match_path("/x"), None);
    }

    #[test]
    fn test_rejects_bad_templates() {
        assert_eq!(
            PathTemplate::parse("items").unwrap_err(),
            TemplateError::MissingLeadingSlash
        );
        assert_eq!(
            PathTemplate::parse("/{id}/{id}").unwrap_err(),
            TemplateError::DuplicateParameter("id".into())
        );
        assert_eq!(
            PathTemplate::parse("/{*rest}/tail").unwrap_err(),
            TemplateError::CatchAllNotLast("rest".into())
        );
        assert_eq!(
            PathTemplate::parse("/{a?}/{b}").unwrap_err(),
            TemplateError::RequiredAfterOptional("b".into())
        );
        assert_eq!(
            PathTemplate::parse("/{}").unwrap_err(),
            TemplateError::EmptyParameterName
        );
        assert!(matches!(
            PathTemplate::parse("/it{ems").unwrap_err(),
            TemplateError::InvalidSegment(_)
        ));
    }

    #[test]
    fn test_parameter_names() {
        let t = PathTemplate::parse("/shops/{shop}/items/{id?}").unwrap();
        assert_eq!(t.parameter_names().collect::<Vec<_>>(), ["shop", "id"]);
    }
}
