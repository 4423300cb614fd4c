//! Collection indexer
//!
//! `PostIndex` owns the validated records and maintains three derived views:
//! by-date (descending, slug ties ascending), by-tag (insertion order per
//! bucket), and featured (the by-date order restricted to featured posts).
//! Views are updated incrementally on upsert/remove; a full rebuild is the
//! always-correct fallback.

use indexmap::IndexMap;

use crate::content::PostRecord;

/// Two different source files resolved to the same slug. The first-seen
/// record is kept; the second is rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct SlugCollision {
    pub slug: String,
    pub source: String,
    pub existing_source: String,
}

impl std::fmt::Display for SlugCollision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "slug `{}` from `{}` already taken by `{}`",
            self.slug, self.source, self.existing_source
        )
    }
}

impl std::error::Error for SlugCollision {}

/// In-memory index over a collection of posts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostIndex {
    /// Slug → record
    records: IndexMap<String, PostRecord>,
    /// Slugs ordered by (date descending, slug ascending)
    by_date: Vec<String>,
    /// Tag → slugs, insertion order preserved per bucket
    by_tag: IndexMap<String, Vec<String>>,
    /// Featured slugs in by-date order
    featured: Vec<String>,
}

impl PostIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a batch of records, collecting slug collisions.
    /// Iteration order determines tag bucket order, so callers feed records
    /// in a deterministic order.
    pub fn rebuild<I>(records: I) -> (Self, Vec<SlugCollision>)
    where
        I: IntoIterator<Item = PostRecord>,
    {
        let mut index = Self::new();
        let mut collisions = Vec::new();
        for record in records {
            if let Err(collision) = index.upsert(record) {
                collisions.push(collision);
            }
        }
        (index, collisions)
    }

    /// Insert a record, or replace the record previously ingested from the
    /// same source file. A slug held by a different source is a collision
    /// and the incoming record is rejected.
    pub fn upsert(&mut self, record: PostRecord) -> Result<(), SlugCollision> {
        if let Some(existing) = self.records.get(&record.slug) {
            if existing.source != record.source {
                return Err(SlugCollision {
                    slug: record.slug.clone(),
                    source: record.source.clone(),
                    existing_source: existing.source.clone(),
                });
            }
        }
        self.insert_or_replace(record);
        Ok(())
    }

    /// Remove a record by slug, cleaning all three views
    pub fn remove(&mut self, slug: &str) -> Option<PostRecord> {
        let record = self.records.shift_remove(slug)?;
        self.by_date.retain(|s| s != slug);
        self.featured.retain(|s| s != slug);
        for tag in &record.tags {
            self.drop_from_bucket(tag, slug);
        }
        Some(record)
    }

    /// Remove the record ingested from the given source file, if any
    pub fn remove_source(&mut self, source: &str) -> Option<PostRecord> {
        let slug = self
            .records
            .values()
            .find(|r| r.source == source)
            .map(|r| r.slug.clone())?;
        self.remove(&slug)
    }

    pub fn get(&self, slug: &str) -> Option<&PostRecord> {
        self.records.get(slug)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &PostRecord> {
        self.records.values()
    }

    /// Slugs ordered by date descending, ties by slug ascending
    pub fn by_date(&self) -> &[String] {
        &self.by_date
    }

    /// Slugs carrying the given tag, in ingest order
    pub fn tag_bucket(&self, tag: &str) -> Option<&[String]> {
        self.by_tag.get(tag).map(|bucket| bucket.as_slice())
    }

    /// All tags with their post counts
    pub fn tags(&self) -> impl Iterator<Item = (&str, usize)> {
        self.by_tag
            .iter()
            .map(|(tag, bucket)| (tag.as_str(), bucket.len()))
    }

    /// Featured slugs in by-date order
    pub fn featured(&self) -> &[String] {
        &self.featured
    }

    fn insert_or_replace(&mut self, record: PostRecord) {
        let slug = record.slug.clone();
        if let Some(old) = self.records.shift_remove(&slug) {
            self.by_date.retain(|s| s != &slug);
            self.featured.retain(|s| s != &slug);
            // Buckets for tags the new record keeps hold their position
            for tag in &old.tags {
                if !record.tags.contains(tag) {
                    self.drop_from_bucket(tag, &slug);
                }
            }
        }

        for tag in &record.tags {
            let bucket = self.by_tag.entry(tag.clone()).or_default();
            if !bucket.iter().any(|s| s == &slug) {
                bucket.push(slug.clone());
            }
        }

        let is_featured = record.featured;
        self.records.insert(slug.clone(), record);
        sorted_insert(&self.records, &mut self.by_date, &slug);
        if is_featured {
            sorted_insert(&self.records, &mut self.featured, &slug);
        }
    }

    fn drop_from_bucket(&mut self, tag: &str, slug: &str) {
        if let Some(bucket) = self.by_tag.get_mut(tag) {
            bucket.retain(|s| s != slug);
            if bucket.is_empty() {
                self.by_tag.shift_remove(tag);
            }
        }
    }
}

/// Insert `slug` into a view kept sorted by (date descending, slug ascending)
fn sorted_insert(records: &IndexMap<String, PostRecord>, view: &mut Vec<String>, slug: &str) {
    let target = &records[slug];
    let pos = view
        .binary_search_by(|probe| {
            let p = &records[probe.as_str()];
            target
                .date
                .cmp(&p.date)
                .then_with(|| probe.as_str().cmp(slug))
        })
        .unwrap_or_else(|pos| pos);
    view.insert(pos, slug.to_string());
}
