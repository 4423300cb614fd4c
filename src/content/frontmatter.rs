//! Front-matter parsing

use indexmap::IndexMap;
use serde_yaml::Value;
use thiserror::Error;

/// Errors produced while splitting a document into front-matter and body
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("front-matter block is never closed")]
    Unterminated,

    #[error("front-matter is not a key: value mapping")]
    NotMapping,

    #[error("invalid front-matter YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A single front-matter value as the YAML parser saw it.
///
/// Coercion (e.g. a bare string where a list is expected) happens in the
/// record builder, never here.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    List(Vec<String>),
    Bool(bool),
    /// Anything else the YAML parser produced (numbers, nested mappings,
    /// mixed lists)
    Other(Value),
}

impl FieldValue {
    fn from_yaml(value: Value) -> Self {
        match value {
            Value::String(s) => FieldValue::Str(s),
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Sequence(items) => {
                if items.iter().all(|v| matches!(v, Value::String(_))) {
                    FieldValue::List(
                        items
                            .into_iter()
                            .filter_map(|v| match v {
                                Value::String(s) => Some(s),
                                _ => None,
                            })
                            .collect(),
                    )
                } else {
                    FieldValue::Other(Value::Sequence(items))
                }
            }
            other => FieldValue::Other(other),
        }
    }
}

/// Parsed but unvalidated front-matter fields, in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontmatterFields {
    fields: IndexMap<String, FieldValue>,
}

impl FrontmatterFields {
    /// Parse front-matter from a document
    /// Returns (fields, remaining body)
    pub fn parse(text: &str) -> Result<(Self, &str), ParseError> {
        let text = text.trim_start();

        // A front-matter fence is exactly `---` on its own line. Anything
        // else (e.g. a `----` thematic break) is body text.
        let rest = match text.strip_prefix("---") {
            Some(r) if r.is_empty() || r.starts_with('\n') || r.starts_with("\r\n") => r,
            _ => return Ok((Self::default(), text)),
        };

        let Some(end) = rest.find("\n---") else {
            return Err(ParseError::Unterminated);
        };
        let yaml = &rest[..end];
        let body = rest[end + 4..].trim_start_matches(['\n', '\r']);

        if yaml.trim().is_empty() {
            return Ok((Self::default(), body));
        }

        let value: Value = serde_yaml::from_str(yaml)?;
        let Value::Mapping(mapping) = value else {
            return Err(ParseError::NotMapping);
        };

        let mut fields = IndexMap::new();
        for (key, value) in mapping {
            let Some(key) = key.as_str() else {
                return Err(ParseError::NotMapping);
            };
            fields.insert(key.to_string(), FieldValue::from_yaml(value));
        }

        Ok((Self { fields }, body))
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_frontmatter() {
        let content = r#"---
title: "Hello World"
date: "2024-01-15"
excerpt: "A first post"
tags: ["rust", "blogging"]
featured: true
---

This is the content.
"#;

        let (fields, body) = FrontmatterFields::parse(content).unwrap();
        assert_eq!(
            fields.get("title"),
            Some(&FieldValue::Str("Hello World".to_string()))
        );
        assert_eq!(
            fields.get("date"),
            Some(&FieldValue::Str("2024-01-15".to_string()))
        );
        assert_eq!(
            fields.get("tags"),
            Some(&FieldValue::List(vec![
                "rust".to_string(),
                "blogging".to_string()
            ]))
        );
        assert_eq!(fields.get("featured"), Some(&FieldValue::Bool(true)));
        assert_eq!(body, "This is the content.\n");
    }

    #[test]
    fn test_no_frontmatter_is_body_only() {
        let content = "Just some markdown.\n\nAnother paragraph.";
        let (fields, body) = FrontmatterFields::parse(content).unwrap();
        assert!(fields.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_unterminated_block_is_an_error() {
        let content = "---\ntitle: Broken\ndate: 2024-01-15\n\nNo closing fence.";
        let err = FrontmatterFields::parse(content).unwrap_err();
        assert!(matches!(err, ParseError::Unterminated));
    }

    #[test]
    fn test_thematic_break_is_not_a_fence() {
        let content = "----\n\nA document starting with a horizontal rule.";
        let (fields, body) = FrontmatterFields::parse(content).unwrap();
        assert!(fields.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_scalar_tags_stay_scalar_in_parser() {
        // Coercion to a one-element list is the builder's job
        let content = "---\ntags: rf\n---\nbody";
        let (fields, _) = FrontmatterFields::parse(content).unwrap();
        assert_eq!(fields.get("tags"), Some(&FieldValue::Str("rf".to_string())));
    }

    #[test]
    fn test_non_scalar_values_are_other() {
        let content = "---\nfeatured: 1\ntags: [1, 2]\n---\nbody";
        let (fields, _) = FrontmatterFields::parse(content).unwrap();
        assert!(matches!(fields.get("featured"), Some(FieldValue::Other(_))));
        assert!(matches!(fields.get("tags"), Some(FieldValue::Other(_))));
    }

    #[test]
    fn test_empty_block() {
        let content = "---\n---\nbody text";
        let (fields, body) = FrontmatterFields::parse(content).unwrap();
        assert!(fields.is_empty());
        assert_eq!(body, "body text");
    }

    #[test]
    fn test_parse_is_stable_across_repeats() {
        let content = "---\ntitle: Stable\ndate: \"2024-02-02\"\ntags: [a, b]\n---\nbody";
        let first = FrontmatterFields::parse(content).unwrap();
        let second = FrontmatterFields::parse(content).unwrap();
        assert_eq!(first, second);
    }
}
