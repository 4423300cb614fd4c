//! Ingest diagnostics and batch reporting
//!
//! One malformed document never aborts the batch: each failure becomes a
//! `Diagnostic` collected into the `IngestReport`, and the batch outcome is
//! summarized once ingestion completes.

use serde::Serialize;
use std::fmt;

/// Classification of a per-document failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed front-matter delimiters or YAML
    Parse,
    /// Missing or invalid required field
    Validation,
    /// Duplicate slug, second document rejected
    SlugCollision,
    /// The source file could not be read
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Parse => "parse",
            ErrorKind::Validation => "validation",
            ErrorKind::SlugCollision => "slug collision",
            ErrorKind::Io => "io",
        };
        write!(f, "{}", name)
    }
}

/// One rejected document
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// Source file the error came from
    pub source: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(source: &str, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            source: source.to_string(),
            kind,
            message: message.into(),
        }
    }
}

/// Outcome of one ingest batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOutcome {
    /// Every document indexed
    Clean,
    /// Some documents indexed, some rejected
    Partial,
    /// At least one error and nothing indexed
    Failed,
    /// No documents found
    Empty,
}

/// Accumulated result of an ingest pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    valid: usize,
    diagnostics: Vec<Diagnostic>,
}

impl IngestReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn record_valid(&mut self) {
        self.valid += 1;
    }

    pub fn set_valid(&mut self, valid: usize) {
        self.valid = valid;
    }

    pub fn valid(&self) -> usize {
        self.valid
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn outcome(&self) -> BatchOutcome {
        match (self.valid, self.diagnostics.is_empty()) {
            (0, false) => BatchOutcome::Failed,
            (0, true) => BatchOutcome::Empty,
            (_, true) => BatchOutcome::Clean,
            (_, false) => BatchOutcome::Partial,
        }
    }

    /// One-line summary for logging
    pub fn summary(&self) -> String {
        match self.outcome() {
            BatchOutcome::Empty => "no posts found".to_string(),
            BatchOutcome::Clean => format!("{} posts indexed", self.valid),
            BatchOutcome::Partial => format!(
                "{} posts indexed, {} rejected",
                self.valid,
                self.diagnostics.len()
            ),
            BatchOutcome::Failed => format!(
                "batch failed: {} rejected, none indexed",
                self.diagnostics.len()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcomes() {
        let mut report = IngestReport::new();
        assert_eq!(report.outcome(), BatchOutcome::Empty);

        report.record_valid();
        assert_eq!(report.outcome(), BatchOutcome::Clean);

        report.push(Diagnostic::new("bad.md", ErrorKind::Validation, "missing title"));
        assert_eq!(report.outcome(), BatchOutcome::Partial);

        let mut failed = IngestReport::new();
        failed.push(Diagnostic::new("bad.md", ErrorKind::Parse, "never closed"));
        assert_eq!(failed.outcome(), BatchOutcome::Failed);
    }

    #[test]
    fn test_summary_mentions_counts() {
        let mut report = IngestReport::new();
        report.set_valid(3);
        report.push(Diagnostic::new("bad.md", ErrorKind::Validation, "invalid date"));
        assert_eq!(report.summary(), "3 posts indexed, 1 rejected");

        let mut failed = IngestReport::new();
        failed.push(Diagnostic::new("bad.md", ErrorKind::Parse, "never closed"));
        assert!(failed.summary().starts_with("batch failed"));
    }
}
