//! Content loader - walks the content directory and runs the ingest pipeline

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::frontmatter::FrontmatterFields;
use super::post::{build_record, PostRecord};
use crate::report::{Diagnostic, ErrorKind, IngestReport};
use crate::Postdex;

/// Loads posts from the content directory
pub struct ContentLoader<'a> {
    app: &'a Postdex,
}

impl<'a> ContentLoader<'a> {
    pub fn new(app: &'a Postdex) -> Self {
        Self { app }
    }

    /// All markdown files under the content directory, sorted so ingest
    /// order (and hence tag bucket order) is deterministic
    pub fn scan(&self) -> Vec<PathBuf> {
        let dir = &self.app.content_dir;
        if !dir.exists() {
            return Vec::new();
        }

        let mut paths: Vec<_> = WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file() && is_markdown_file(e.path()))
            .map(|e| e.into_path())
            .collect();
        paths.sort();
        paths
    }

    /// Load every post, collecting one diagnostic per rejected document.
    /// A bad file never aborts the batch.
    pub fn load_posts(&self) -> (Vec<PostRecord>, IngestReport) {
        let mut records = Vec::new();
        let mut report = IngestReport::new();

        for path in self.scan() {
            match self.load_post(&path) {
                Ok(record) => records.push(record),
                Err(diagnostic) => {
                    tracing::warn!("Failed to load post {:?}: {}", path, diagnostic.message);
                    report.push(diagnostic);
                }
            }
        }

        (records, report)
    }

    /// Run the parse-and-build pipeline for a single file
    pub fn load_post(&self, path: &Path) -> Result<PostRecord, Diagnostic> {
        let source = self.rel_source(path);

        let content = fs::read_to_string(path)
            .map_err(|e| Diagnostic::new(&source, ErrorKind::Io, e.to_string()))?;

        let (fields, body) = FrontmatterFields::parse(&content)
            .map_err(|e| Diagnostic::new(&source, ErrorKind::Parse, e.to_string()))?;

        build_record(&fields, body, &source)
            .map_err(|e| Diagnostic::new(&source, ErrorKind::Validation, e.to_string()))
    }

    /// Source identifier relative to the content directory
    pub fn rel_source(&self, path: &Path) -> String {
        path.strip_prefix(&self.app.content_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string()
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}
