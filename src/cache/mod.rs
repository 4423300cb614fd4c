//! Ingest cache for incremental passes
//!
//! Tracks a content hash per source file so an incremental ingest pass can
//! re-parse only changed files and drop records for deleted ones. A full
//! ingest remains the always-correct fallback.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Cache file name
const CACHE_FILE: &str = ".postdex-cache/db.json";

/// Cached state for one indexed source file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Content hash of the source file
    pub content_hash: u64,
    /// Slug the file was indexed under
    pub slug: String,
}

/// Cache database for tracking file changes between ingest passes
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheDb {
    /// Version of the cache format
    pub version: u32,
    /// Entries keyed by source path
    pub entries: HashMap<String, CacheEntry>,
}

impl CacheDb {
    /// Current cache format version
    const VERSION: u32 = 1;

    /// Load cache from disk, or create a new empty cache
    pub fn load(base_dir: &Path) -> Self {
        let cache_path = base_dir.join(CACHE_FILE);
        if let Ok(content) = fs::read_to_string(&cache_path) {
            if let Ok(cache) = serde_json::from_str::<CacheDb>(&content) {
                if cache.version == Self::VERSION {
                    return cache;
                }
                tracing::info!("Cache version mismatch, starting fresh");
            }
        }
        Self::default()
    }

    /// Save cache to disk
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let cache_dir = base_dir.join(".postdex-cache");
        fs::create_dir_all(&cache_dir)?;

        let cache_path = base_dir.join(CACHE_FILE);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(cache_path, content)?;
        Ok(())
    }

    /// Create a new cache with version set
    pub fn new() -> Self {
        Self {
            version: Self::VERSION,
            ..Default::default()
        }
    }

    /// Replace all entries with the given (source, hash, slug) set
    pub fn update<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, u64, String)>,
    {
        self.version = Self::VERSION;
        self.entries.clear();
        for (source, content_hash, slug) in entries {
            self.entries.insert(source, CacheEntry { content_hash, slug });
        }
    }
}

/// Change detection result
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    /// New or modified source files
    pub changed: Vec<String>,
    /// Source files present in the cache but gone from disk
    pub deleted: Vec<String>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.deleted.is_empty()
    }

    /// Get summary of changes for logging
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.changed.is_empty() {
            parts.push(format!("{} posts changed", self.changed.len()));
        }
        if !self.deleted.is_empty() {
            parts.push(format!("{} posts deleted", self.deleted.len()));
        }

        if parts.is_empty() {
            "no changes".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Calculate a hash for file content
pub fn hash_content(content: &str) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}

/// Calculate a hash for a file on disk
pub fn hash_file(path: &Path) -> Result<u64> {
    let content = fs::read_to_string(path)?;
    Ok(hash_content(&content))
}

/// Detect changes between the current file set and the cached state.
/// `current` holds (source, content hash) pairs in scan order.
pub fn detect_changes(cache: &CacheDb, current: &[(String, u64)]) -> ChangeSet {
    let mut changes = ChangeSet::default();

    for (source, hash) in current {
        match cache.entries.get(source) {
            Some(entry) if entry.content_hash == *hash => {}
            Some(_) => {
                tracing::debug!("Post changed: {}", source);
                changes.changed.push(source.clone());
            }
            None => {
                tracing::debug!("New post: {}", source);
                changes.changed.push(source.clone());
            }
        }
    }

    let current_sources: HashSet<&String> = current.iter().map(|(s, _)| s).collect();
    for source in cache.entries.keys() {
        if !current_sources.contains(source) {
            tracing::debug!("Deleted post: {}", source);
            changes.deleted.push(source.clone());
        }
    }
    // Entry iteration order is arbitrary
    changes.deleted.sort();

    changes
}
