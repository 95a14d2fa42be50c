//! Reference-site scraper with an on-disk cache.
//!
//! Scraping is best effort: fetch or parse failures are logged and yield
//! empty text, they never fail the caller.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use md5::{Digest, Md5};
use rand::seq::SliceRandom;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, USER_AGENT};
use reqwest::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

const USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
];

const SKIPPED_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

/// One cache file: `<cache_dir>/<md5(url)>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedPage {
    pub title: String,
    pub content: String,
    /// Epoch milliseconds at fetch time.
    pub timestamp: i64,
}

#[derive(Debug, Clone)]
pub struct Scraper {
    client: Client,
    cache_dir: PathBuf,
    ttl: Duration,
}

impl Scraper {
    pub fn new(cache_dir: impl Into<PathBuf>, ttl: Duration) -> Result<Self> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            cache_dir: cache_dir.into(),
            ttl,
        })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Visible text of `url`, from cache when fresh. Empty on failure.
    #[instrument(skip(self))]
    pub async fn scrape(&self, url: &str) -> String {
        if let Some(cached) = self.read_cache(url).await {
            debug!("cache hit");
            return cached.content;
        }

        let page = match self.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "scrape failed, continuing without reference text");
                return String::new();
            }
        };

        if let Err(e) = self.write_cache(url, &page).await {
            warn!(error = %e, "failed to write scrape cache");
        }
        page.content
    }

    async fn fetch(&self, url: &str) -> Result<CachedPage> {
        let agent = USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0]);

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, agent)
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            )
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.5")
            .header(CACHE_CONTROL, "max-age=0")
            .send()
            .await
            .with_context(|| format!("failed to fetch {url}"))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("failed to fetch {url}: {status}");
        }

        let html = response
            .text()
            .await
            .with_context(|| format!("failed to read body of {url}"))?;
        let (title, content) = extract_text(&html);

        Ok(CachedPage {
            title: title.unwrap_or_else(|| url.to_string()),
            content,
            timestamp: Utc::now().timestamp_millis(),
        })
    }

    fn cache_path(&self, url: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", cache_key(url)))
    }

    async fn read_cache(&self, url: &str) -> Option<CachedPage> {
        let raw = tokio::fs::read_to_string(self.cache_path(url)).await.ok()?;
        let cached: CachedPage = serde_json::from_str(&raw).ok()?;
        let age_ms = Utc::now().timestamp_millis() - cached.timestamp;
        if age_ms > self.ttl.as_millis() as i64 {
            return None;
        }
        Some(cached)
    }

    async fn write_cache(&self, url: &str, page: &CachedPage) -> Result<()> {
        tokio::fs::create_dir_all(&self.cache_dir).await?;
        tokio::fs::write(self.cache_path(url), serde_json::to_vec(page)?).await?;
        Ok(())
    }
}

/// Hex MD5 of the URL.
pub fn cache_key(url: &str) -> String {
    let digest = Md5::digest(url.as_bytes());
    let mut key = String::with_capacity(32);
    for byte in digest {
        let _ = write!(key, "{byte:02x}");
    }
    key
}

/// The document title (if any) and its visible text with whitespace
/// collapsed to single spaces.
pub fn extract_text(html: &str) -> (Option<String>, String) {
    let doc = Html::parse_document(html);

    let title = Selector::parse("title").ok().and_then(|sel| {
        doc.select(&sel)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    });

    let mut words: Vec<&str> = Vec::new();
    for node in doc.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| SKIPPED_ELEMENTS.contains(&e.name()) || e.name() == "title")
        });
        if !hidden {
            words.extend(text.split_whitespace());
        }
    }

    (title, words.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_is_hex_md5() {
        assert_eq!(cache_key(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(cache_key("https://example.com").len(), 32);
    }

    #[test]
    fn extract_skips_scripts_and_collapses_whitespace() {
        let html = r#"<html><head><title> Toys </title><style>p { color: red }</style></head>
            <body><h1>Learning
            through   play</h1><script>var x = 1;</script><noscript>enable js</noscript>
            <p>Blocks &amp; puzzles</p></body></html>"#;
        let (title, text) = extract_text(html);
        assert_eq!(title.as_deref(), Some("Toys"));
        assert_eq!(text, "Learning through play Blocks & puzzles");
    }
}
