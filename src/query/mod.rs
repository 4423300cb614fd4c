//! Query layer - read-only operations over a `PostIndex`
//!
//! All operations are side-effect-free. Misses (unknown slug, unknown tag,
//! out-of-range page) are empty results, never errors.

use serde::Serialize;

use crate::content::PostRecord;
use crate::index::PostIndex;

/// One page of query results with pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    /// Total items across all pages
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    fn empty(page: usize, page_size: usize, total: usize, total_pages: usize) -> Self {
        Self {
            items: Vec::new(),
            page,
            page_size,
            total,
            total_pages,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Read-only view over a borrowed index
pub struct QueryEngine<'a> {
    index: &'a PostIndex,
}

impl<'a> QueryEngine<'a> {
    pub fn new(index: &'a PostIndex) -> Self {
        Self { index }
    }

    /// Posts in date-descending order, paginated. Pages are 1-based.
    pub fn list(&self, page: usize, page_size: usize) -> Page<&'a PostRecord> {
        self.paginate(self.index.by_date(), page, page_size)
    }

    pub fn get_by_slug(&self, slug: &str) -> Option<&'a PostRecord> {
        self.index.get(slug)
    }

    /// Posts carrying the given tag, paginated. An unknown tag yields an
    /// empty page.
    pub fn filter_by_tag(&self, tag: &str, page: usize, page_size: usize) -> Page<&'a PostRecord> {
        let bucket = self.index.tag_bucket(tag).unwrap_or(&[]);
        self.paginate(bucket, page, page_size)
    }

    /// Featured posts in date-descending order
    pub fn list_featured(&self) -> Vec<&'a PostRecord> {
        self.index
            .featured()
            .iter()
            .filter_map(|slug| self.index.get(slug))
            .collect()
    }

    /// All tags with post counts, most-used first, name ties ascending
    pub fn tags(&self) -> Vec<(&'a str, usize)> {
        let mut tags: Vec<_> = self.index.tags().collect();
        tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        tags
    }

    fn paginate(&self, slugs: &[String], page: usize, page_size: usize) -> Page<&'a PostRecord> {
        let total = slugs.len();
        let total_pages = if page_size == 0 {
            0
        } else {
            total.div_ceil(page_size)
        };

        if page == 0 || page_size == 0 {
            return Page::empty(page, page_size, total, total_pages);
        }
        let start = (page - 1).saturating_mul(page_size);
        if start >= total {
            return Page::empty(page, page_size, total, total_pages);
        }

        let end = (start + page_size).min(total);
        let items = slugs[start..end]
            .iter()
            .filter_map(|slug| self.index.get(slug))
            .collect();

        Page {
            items,
            page,
            page_size,
            total,
            total_pages,
        }
    }
}
