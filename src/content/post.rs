//! Post record model and validation

use chrono::NaiveDate;
use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

use super::frontmatter::{FieldValue, FrontmatterFields};

lazy_static! {
    /// Leading `YYYY-MM-DD-` (or `YYYY-MM-DD_`) prefix on post filenames
    static ref DATE_PREFIX: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}[-_]").unwrap();
}

/// Validation failures turning front-matter fields into a record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("missing title")]
    MissingTitle,

    #[error("invalid date: field is missing")]
    MissingDate,

    #[error("invalid date `{0}` (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("`tags` must be a string or a list of strings")]
    InvalidTags,

    #[error("`featured` must be a literal boolean")]
    InvalidFeatured,

    #[error("`{0}` must be a string")]
    InvalidField(&'static str),
}

/// A canonical, validated blog post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    /// Unique URL-safe identifier
    pub slug: String,

    /// Post title
    pub title: String,

    /// Publication date
    pub date: NaiveDate,

    /// Short summary, empty when absent
    pub excerpt: String,

    /// Tags, insertion order preserved
    pub tags: IndexSet<String>,

    /// Whether the post is featured
    pub featured: bool,

    /// Markdown body after the front-matter block
    pub body: String,

    /// Source file path relative to the content directory
    pub source: String,
}

/// Derive a slug from a source filename: strip the extension, strip a
/// leading date prefix, lowercase and hyphenate.
pub fn derive_slug(source: &str) -> String {
    let stem = Path::new(source)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled");
    let stem = DATE_PREFIX.replace(stem, "");
    slug::slugify(stem)
}

/// Validate front-matter fields and body text into a `PostRecord`
pub fn build_record(
    fields: &FrontmatterFields,
    body: &str,
    source: &str,
) -> Result<PostRecord, BuildError> {
    let title = match fields.get("title") {
        Some(FieldValue::Str(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(FieldValue::Str(_)) | None => return Err(BuildError::MissingTitle),
        Some(_) => return Err(BuildError::InvalidField("title")),
    };

    let date = match fields.get("date") {
        Some(FieldValue::Str(s)) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|_| BuildError::InvalidDate(s.clone()))?,
        Some(_) => return Err(BuildError::InvalidField("date")),
        None => return Err(BuildError::MissingDate),
    };

    let excerpt = match fields.get("excerpt") {
        Some(FieldValue::Str(s)) => s.clone(),
        Some(_) => return Err(BuildError::InvalidField("excerpt")),
        None => String::new(),
    };

    let mut tags = IndexSet::new();
    match fields.get("tags") {
        Some(FieldValue::List(items)) => {
            for tag in items {
                tags.insert(tag.clone());
            }
        }
        // A bare string is accepted as a one-element list
        Some(FieldValue::Str(s)) => {
            tags.insert(s.clone());
        }
        Some(_) => return Err(BuildError::InvalidTags),
        None => {}
    }

    let featured = match fields.get("featured") {
        Some(FieldValue::Bool(b)) => *b,
        Some(_) => return Err(BuildError::InvalidFeatured),
        None => false,
    };

    let slug = match fields.get("slug") {
        Some(FieldValue::Str(s)) if !s.trim().is_empty() => slug::slugify(s.trim()),
        Some(FieldValue::Str(_)) | None => derive_slug(source),
        Some(_) => return Err(BuildError::InvalidField("slug")),
    };

    Ok(PostRecord {
        slug,
        title,
        date,
        excerpt,
        tags,
        featured,
        body: body.to_string(),
        source: source.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::frontmatter::FrontmatterFields;

    fn fields_of(frontmatter: &str) -> FrontmatterFields {
        let doc = format!("---\n{}\n---\nbody", frontmatter);
        let (fields, _) = FrontmatterFields::parse(&doc).unwrap();
        fields
    }

    #[test]
    fn test_build_valid_record() {
        let fields = fields_of(
            "title: Hello\ndate: \"2024-01-15\"\nexcerpt: hi\ntags: [rust, blog]\nfeatured: true",
        );
        let record = build_record(&fields, "body text", "hello.md").unwrap();
        assert_eq!(record.slug, "hello");
        assert_eq!(record.title, "Hello");
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(record.excerpt, "hi");
        assert!(record.tags.contains("rust"));
        assert!(record.tags.contains("blog"));
        assert!(record.featured);
        assert_eq!(record.body, "body text");
        assert_eq!(record.source, "hello.md");
    }

    #[test]
    fn test_missing_title() {
        let fields = fields_of("date: \"2024-01-15\"");
        assert_eq!(
            build_record(&fields, "", "a.md").unwrap_err(),
            BuildError::MissingTitle
        );

        let fields = fields_of("title: \"\"\ndate: \"2024-01-15\"");
        assert_eq!(
            build_record(&fields, "", "a.md").unwrap_err(),
            BuildError::MissingTitle
        );
    }

    #[test]
    fn test_invalid_date_rejected() {
        let fields = fields_of("title: T\ndate: \"not-a-date\"");
        assert_eq!(
            build_record(&fields, "", "a.md").unwrap_err(),
            BuildError::InvalidDate("not-a-date".to_string())
        );

        let fields = fields_of("title: T");
        assert_eq!(
            build_record(&fields, "", "a.md").unwrap_err(),
            BuildError::MissingDate
        );

        // Feb 30 is not a calendar date
        let fields = fields_of("title: T\ndate: \"2024-02-30\"");
        assert!(matches!(
            build_record(&fields, "", "a.md").unwrap_err(),
            BuildError::InvalidDate(_)
        ));
    }

    #[test]
    fn test_scalar_tag_coerced_to_list() {
        let fields = fields_of("title: T\ndate: \"2024-01-15\"\ntags: rf");
        let record = build_record(&fields, "", "a.md").unwrap();
        assert_eq!(record.tags.iter().collect::<Vec<_>>(), vec!["rf"]);
    }

    #[test]
    fn test_non_list_tags_rejected() {
        let fields = fields_of("title: T\ndate: \"2024-01-15\"\ntags: true");
        assert_eq!(
            build_record(&fields, "", "a.md").unwrap_err(),
            BuildError::InvalidTags
        );
    }

    #[test]
    fn test_duplicate_tags_collapse() {
        let fields = fields_of("title: T\ndate: \"2024-01-15\"\ntags: [rust, web, rust]");
        let record = build_record(&fields, "", "a.md").unwrap();
        assert_eq!(record.tags.iter().collect::<Vec<_>>(), vec!["rust", "web"]);
    }

    #[test]
    fn test_featured_must_be_literal_boolean() {
        let fields = fields_of("title: T\ndate: \"2024-01-15\"\nfeatured: \"yes\"");
        assert_eq!(
            build_record(&fields, "", "a.md").unwrap_err(),
            BuildError::InvalidFeatured
        );
    }

    #[test]
    fn test_defaults_when_optional_fields_absent() {
        let fields = fields_of("title: T\ndate: \"2024-01-15\"");
        let record = build_record(&fields, "", "a.md").unwrap();
        assert!(record.tags.is_empty());
        assert!(!record.featured);
        assert_eq!(record.excerpt, "");
    }

    #[test]
    fn test_slug_derivation_strips_date_prefix() {
        assert_eq!(derive_slug("2024-01-15-My Post.md"), "my-post");
        assert_eq!(derive_slug("2024-01-15_my_post.md"), "my-post");
        assert_eq!(derive_slug("plain-post.md"), "plain-post");
        assert_eq!(derive_slug("nested/2023-12-31-Year End.md"), "year-end");
    }

    #[test]
    fn test_explicit_slug_wins_over_filename() {
        let fields = fields_of("title: T\ndate: \"2024-01-15\"\nslug: Custom Slug");
        let record = build_record(&fields, "", "2024-01-15-ignored.md").unwrap();
        assert_eq!(record.slug, "custom-slug");
    }
}
