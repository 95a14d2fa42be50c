//! Ingestion run configuration, read from a TOML file.
//!
//! Unknown keys are rejected so that a typo does not silently fall back to
//! a default. Everything after the tenant list has a default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use hostpress_core::bail_hp;
use serde::{Deserialize, Serialize};

/// Inclusive `min..=max` bounds for a count the model is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngestConfig {
    /// Tenant host keys to fill.
    pub domains: Vec<String>,

    /// External sites scraped for reference text. Entries without a scheme
    /// get `https://`.
    #[serde(default, alias = "client_domains")]
    pub reference_sites: Vec<String>,

    /// Candidate domain titles; one is picked per new tenant.
    pub titles: Vec<String>,
    pub descriptions: Vec<String>,
    pub keywords: Vec<String>,

    #[serde(default = "default_total_posts")]
    pub total_posts: u32,

    /// Tenants processed concurrently per batch.
    #[serde(default = "default_thread_count")]
    pub thread_count: usize,

    #[serde(default = "default_section_range")]
    pub section_range: CountRange,
    #[serde(default = "default_subsection_range")]
    pub subsection_range: CountRange,

    #[serde(default = "default_author")]
    pub author: String,

    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Scraped text kept per reference site, in characters.
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
}

fn default_total_posts() -> u32 {
    2
}
fn default_thread_count() -> usize {
    3
}
fn default_section_range() -> CountRange {
    CountRange::new(5, 10)
}
fn default_subsection_range() -> CountRange {
    CountRange::new(5, 10)
}
fn default_author() -> String {
    "Hostpress".into()
}
pub(crate) fn default_model() -> String {
    "gpt-4o-mini-2024-07-18".into()
}
fn default_api_base() -> String {
    "https://api.openai.com/v1".into()
}
fn default_api_key_env() -> String {
    "OPENAI_KEY".into()
}
fn default_cache_dir() -> PathBuf {
    PathBuf::from(".cache")
}
fn default_cache_ttl_secs() -> u64 {
    24 * 60 * 60
}
fn default_excerpt_chars() -> usize {
    1000
}

impl IngestConfig {
    /// Read, parse and validate the file at `path`.
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = Self::from_toml(&raw)?;
        tracing::debug!(path = %path.display(), tenants = config.domains.len(), "loaded ingest config");
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = match toml::from_str(raw) {
            Ok(c) => c,
            Err(e) => bail_hp!(validation, "Invalid ingest config: {}", e.message()),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, list) in [
            ("domains", &self.domains),
            ("titles", &self.titles),
            ("descriptions", &self.descriptions),
            ("keywords", &self.keywords),
        ] {
            if list.iter().all(|s| s.trim().is_empty()) {
                bail_hp!(validation, "Invalid ingest config: {} must not be empty", name);
            }
        }
        if self.thread_count == 0 {
            bail_hp!(validation, "Invalid ingest config: thread_count must be at least 1");
        }
        for (name, range) in [
            ("section_range", self.section_range),
            ("subsection_range", self.subsection_range),
        ] {
            if range.min == 0 || range.min > range.max {
                bail_hp!(
                    validation,
                    "Invalid ingest config: {} needs 1 <= min <= max",
                    name
                );
            }
        }
        if self.model.trim().is_empty() {
            bail_hp!(validation, "Invalid ingest config: model must not be empty");
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostpress_core::{ErrorKind, HostpressError};

    const MINIMAL: &str = r#"
domains = ["beijing.example.net"]
titles = ["Baby Development Guide"]
descriptions = ["Your trusted guide"]
keywords = ["Baby Development", "Educational Toys"]
"#;

    #[test]
    fn minimal_file_gets_defaults() {
        let config = IngestConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.total_posts, 2);
        assert_eq!(config.thread_count, 3);
        assert_eq!(config.section_range, CountRange::new(5, 10));
        assert_eq!(config.model, "gpt-4o-mini-2024-07-18");
        assert_eq!(config.api_key_env, "OPENAI_KEY");
        assert_eq!(config.excerpt_chars, 1000);
        assert_eq!(config.cache_ttl(), Duration::from_secs(86_400));
        assert!(config.reference_sites.is_empty());
    }

    #[test]
    fn legacy_client_domains_key_is_accepted() {
        let raw = format!("{MINIMAL}client_domains = [\"https://learn.example.com/\"]\n");
        let config = IngestConfig::from_toml(&raw).unwrap();
        assert_eq!(config.reference_sites, vec!["https://learn.example.com/"]);
    }

    #[test]
    fn empty_keywords_are_rejected() {
        let raw = MINIMAL.replace(
            r#"keywords = ["Baby Development", "Educational Toys"]"#,
            "keywords = []",
        );
        let err = IngestConfig::from_toml(&raw).unwrap_err();
        assert_eq!(HostpressError::kind_of(&err), Some(ErrorKind::Validation));
        assert!(err.to_string().contains("keywords"));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let raw = format!("{MINIMAL}section_range = {{ min = 4, max = 2 }}\n");
        assert!(IngestConfig::from_toml(&raw).is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let raw = format!("{MINIMAL}thread_cuont = 4\n");
        let err = IngestConfig::from_toml(&raw).unwrap_err();
        assert_eq!(HostpressError::kind_of(&err), Some(ErrorKind::Validation));
    }
}
