//! postdex: a content model and indexing pipeline for Markdown blogs
//!
//! This crate parses a directory of Markdown files with YAML front-matter,
//! validates them into canonical post records, and serves read-only queries
//! (by date, by tag, and by featured status) over the in-memory index.

pub mod cache;
pub mod config;
pub mod content;
pub mod index;
pub mod query;
pub mod report;

use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use cache::CacheDb;
use content::loader::ContentLoader;
use index::PostIndex;
use report::{Diagnostic, ErrorKind, IngestReport};

/// The main postdex application
#[derive(Clone)]
pub struct Postdex {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory holding post files
    pub content_dir: PathBuf,
}

impl Postdex {
    /// Create a new instance from a directory, loading `postdex.yml` when
    /// present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("postdex.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let content_dir = base_dir.join(&config.content_dir);

        Ok(Self {
            config,
            base_dir,
            content_dir,
        })
    }

    /// Full ingest pass: parse every file, rebuild the index from scratch,
    /// and refresh the on-disk hash cache
    pub fn ingest(&self) -> Result<(PostIndex, IngestReport)> {
        let loader = ContentLoader::new(self);
        let (records, mut report) = loader.load_posts();

        let (index, collisions) = PostIndex::rebuild(records);
        for collision in collisions {
            tracing::warn!("{}", collision);
            report.push(Diagnostic::new(
                &collision.source,
                ErrorKind::SlugCollision,
                collision.to_string(),
            ));
        }
        report.set_valid(index.len());

        self.save_cache(&index)?;
        Ok((index, report))
    }

    /// Incremental pass against a live index: re-parse only files whose
    /// content hash changed since the last pass, drop records for deleted
    /// files, and leave everything else untouched
    pub fn refresh(&self, index: &mut PostIndex) -> Result<IngestReport> {
        let loader = ContentLoader::new(self);
        let cache = CacheDb::load(&self.base_dir);
        let current = self.scan_hashes(&loader);
        let changes = cache::detect_changes(&cache, &current);
        tracing::info!("Change detection: {}", changes.summary());

        let mut report = IngestReport::new();

        for source in &changes.deleted {
            match cache.entries.get(source) {
                Some(entry) => {
                    index.remove(&entry.slug);
                }
                None => {
                    index.remove_source(source);
                }
            }
        }

        for source in &changes.changed {
            let path = self.content_dir.join(source);
            // An edit may change the slug; drop the stale record first
            index.remove_source(source);
            match loader.load_post(&path) {
                Ok(record) => match index.upsert(record) {
                    Ok(()) => report.record_valid(),
                    Err(collision) => {
                        tracing::warn!("{}", collision);
                        report.push(Diagnostic::new(
                            source,
                            ErrorKind::SlugCollision,
                            collision.to_string(),
                        ));
                    }
                },
                Err(diagnostic) => {
                    tracing::warn!("Failed to load post {:?}: {}", path, diagnostic.message);
                    report.push(diagnostic);
                }
            }
        }

        // Cache reflects exactly what is indexed now
        let hash_by_source: HashMap<&String, u64> =
            current.iter().map(|(source, hash)| (source, *hash)).collect();
        let mut cache = CacheDb::new();
        cache.update(index.records().filter_map(|record| {
            hash_by_source
                .get(&record.source)
                .map(|hash| (record.source.clone(), *hash, record.slug.clone()))
        }));
        cache.save(&self.base_dir)?;

        Ok(report)
    }

    /// Changes in the content directory since the last saved ingest pass
    pub fn pending_changes(&self) -> cache::ChangeSet {
        let loader = ContentLoader::new(self);
        let cache = CacheDb::load(&self.base_dir);
        let current = self.scan_hashes(&loader);
        cache::detect_changes(&cache, &current)
    }

    fn scan_hashes(&self, loader: &ContentLoader) -> Vec<(String, u64)> {
        let mut hashes = Vec::new();
        for path in loader.scan() {
            match cache::hash_file(&path) {
                Ok(hash) => hashes.push((loader.rel_source(&path), hash)),
                Err(e) => {
                    tracing::warn!("Failed to read {:?}: {}", path, e);
                }
            }
        }
        hashes
    }

    fn save_cache(&self, index: &PostIndex) -> Result<()> {
        let mut cache = CacheDb::new();
        let mut entries = Vec::new();
        for record in index.records() {
            let path = self.content_dir.join(&record.source);
            if let Ok(hash) = cache::hash_file(&path) {
                entries.push((record.source.clone(), hash, record.slug.clone()));
            }
        }
        cache.update(entries);
        cache.save(&self.base_dir)
    }
}
