//! Site configuration (postdex.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site title, informational only
    pub title: String,
    pub description: String,

    /// Directory holding post files, relative to the site root
    pub content_dir: String,

    /// Default page size for listings
    pub per_page: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            description: String::new(),
            content_dir: "content/posts".to_string(),
            per_page: 10,
        }
    }
}

impl SiteConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = SiteConfig::default();
        assert_eq!(config.content_dir, "content/posts");
        assert_eq!(config.per_page, 10);
    }

    #[test]
    fn test_load_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("postdex.yml");
        fs::write(&path, "title: My Blog\nper_page: 5\n").unwrap();

        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.per_page, 5);
        // Unspecified fields keep their defaults
        assert_eq!(config.content_dir, "content/posts");
    }
}
