use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Where the three feeds live and how the search-index wait behaves.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Prepended to every feed path; empty means paths are used as given.
    pub base_url: String,
    pub categories_path: String,
    pub manifest_path: String,
    pub search_source_path: String,
    /// Directory used to build `_plainPath` for manifest-style records.
    pub plain_articles_dir: String,
    pub poll_interval_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            categories_path: "/indexes/categories.json".to_string(),
            manifest_path: "/_manifest.json".to_string(),
            search_source_path: "/build_plain_articles/_search_source.json".to_string(),
            plain_articles_dir: "/build_plain_articles".to_string(),
            poll_interval_ms: 50,
        }
    }
}

impl CatalogConfig {
    /// Read a JSON config file; missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn url_for(&self, path: &str) -> String {
        if self.base_url.is_empty() {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn categories_url(&self) -> String {
        self.url_for(&self.categories_path)
    }

    pub fn manifest_url(&self) -> String {
        self.url_for(&self.manifest_path)
    }

    pub fn search_source_url(&self) -> String {
        self.url_for(&self.search_source_path)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_base_and_path() {
        let mut cfg = CatalogConfig::default();
        assert_eq!(cfg.manifest_url(), "/_manifest.json");
        cfg.base_url = "https://archive.example.com/".into();
        assert_eq!(cfg.manifest_url(), "https://archive.example.com/_manifest.json");
        assert_eq!(
            cfg.search_source_url(),
            "https://archive.example.com/build_plain_articles/_search_source.json"
        );
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: CatalogConfig =
            serde_json::from_str(r#"{ "base_url": "http://localhost:8080", "poll_interval_ms": 0 }"#).unwrap();
        assert_eq!(cfg.base_url, "http://localhost:8080");
        assert_eq!(cfg.categories_path, "/indexes/categories.json");
        assert_eq!(cfg.poll_interval(), Duration::from_millis(1));
    }
}
