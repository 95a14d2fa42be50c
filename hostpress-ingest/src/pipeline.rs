//! Tenant fill: scrape references, outline, expand sections, persist.
//!
//! Tenants run in batches of `thread_count`. Within a tenant, posts,
//! sections and subsections fan out without a cap. A language-model or
//! store failure fails the post it belongs to and marks the tenant as
//! failed; other tenants are unaffected.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use chrono::Utc;
use futures::future::{join_all, try_join_all};
use hostpress_core::{ErrorKind, HostKey, HostpressError};
use hostpress_store::{BlogStore, Domain, NewDomain, NewPost, Post};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::config::IngestConfig;
use crate::llm::CompletionClient;
use crate::outline;
use crate::scraper::Scraper;

const SLUG_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantReport {
    pub host: String,
    pub posts_created: usize,
    /// First failure for this tenant, if any post failed.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub tenants: Vec<TenantReport>,
}

impl IngestReport {
    pub fn posts_created(&self) -> usize {
        self.tenants.iter().map(|t| t.posts_created).sum()
    }

    pub fn failed(&self) -> impl Iterator<Item = &TenantReport> {
        self.tenants.iter().filter(|t| t.error.is_some())
    }
}

pub struct Pipeline {
    config: Arc<IngestConfig>,
    store: Arc<dyn BlogStore>,
    llm: Arc<dyn CompletionClient>,
    scraper: Scraper,
    rng: Mutex<StdRng>,
}

/// A post's inputs, drawn before any network call.
struct PostPlan {
    keywords: Vec<String>,
    sites: Vec<String>,
}

impl Pipeline {
    pub fn new(
        config: Arc<IngestConfig>,
        store: Arc<dyn BlogStore>,
        llm: Arc<dyn CompletionClient>,
        scraper: Scraper,
    ) -> Self {
        Self {
            config,
            store,
            llm,
            scraper,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Fix the random draws (keywords, sites, titles).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub async fn run(&self) -> IngestReport {
        let mut report = IngestReport::default();
        let batch_size = self.config.thread_count.max(1);

        for (i, batch) in self.config.domains.chunks(batch_size).enumerate() {
            info!(batch = i + 1, tenants = batch.len(), "starting batch");
            let results = join_all(batch.iter().map(|host| self.fill_tenant(host))).await;
            report.tenants.extend(results);
        }

        info!(
            tenants = report.tenants.len(),
            posts = report.posts_created(),
            failed = report.failed().count(),
            "ingestion finished"
        );
        report
    }

    #[instrument(skip(self))]
    async fn fill_tenant(&self, host: &str) -> TenantReport {
        let mut report = TenantReport {
            host: host.to_string(),
            posts_created: 0,
            error: None,
        };

        if let Err(e) = self.ensure_domain(host).await {
            error!(error = %e, "could not ensure domain, skipping tenant");
            report.error = Some(e.to_string());
            return report;
        }

        let total = self.config.total_posts as usize;
        let outcomes = join_all((0..total).map(|i| self.generate_post(host, i))).await;

        for outcome in outcomes {
            match outcome {
                Ok(post) => {
                    info!(title = %post.title, slug = %post.slug, "created post");
                    report.posts_created += 1;
                }
                Err(e) => {
                    error!(error = %e, "post generation failed");
                    report.error.get_or_insert_with(|| e.to_string());
                }
            }
        }
        report
    }

    /// Create the domain record unless one exists.
    async fn ensure_domain(&self, host: &str) -> Result<()> {
        let key = HostKey::new(host);
        if self.store.find_domain(&key).await?.is_some() {
            debug!("domain exists");
            return Ok(());
        }

        let (title, description) = {
            let mut rng = self.rng();
            (
                self.config.titles.choose(&mut *rng).cloned().unwrap_or_default(),
                self.config
                    .descriptions
                    .choose(&mut *rng)
                    .cloned()
                    .unwrap_or_default(),
            )
        };

        let new = NewDomain {
            host_key: host.to_string(),
            title,
            description,
        };
        new.validated()?;

        match self.store.insert_domain(new.into_domain(Utc::now())).await {
            Ok(Domain { host_key, .. }) => {
                info!(%host_key, "created domain");
                Ok(())
            }
            Err(e) if HostpressError::kind_of(&e) == Some(ErrorKind::Conflict) => {
                debug!("domain created concurrently");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn plan(&self) -> PostPlan {
        let mut rng = self.rng();
        let keywords = pick(&mut *rng, &self.config.keywords, 2, 4);
        let sites = pick(&mut *rng, &self.config.reference_sites, 1, 2)
            .into_iter()
            .map(|s| site_url(&s))
            .collect();
        PostPlan { keywords, sites }
    }

    #[instrument(skip(self))]
    async fn generate_post(&self, host: &str, index: usize) -> Result<Post> {
        let PostPlan { keywords, sites } = self.plan();
        info!(keywords = %keywords.join(", "), "generating post");

        let excerpt_chars = self.config.excerpt_chars;
        let references: Vec<String> = join_all(sites.iter().map(|url| async move {
            self.scraper
                .scrape(url)
                .await
                .chars()
                .take(excerpt_chars)
                .collect::<String>()
        }))
        .await;

        let reply = self
            .llm
            .complete(
                outline::OUTLINE_SYSTEM,
                &outline::outline_prompt(
                    &keywords,
                    self.config.section_range,
                    self.config.subsection_range,
                ),
            )
            .await?;
        let outline_html = outline::clean_outline(&reply);
        let sections = outline::section_titles(&outline_html);
        if sections.is_empty() {
            warn!("outline has no sections");
        }

        let bodies = try_join_all(
            sections
                .iter()
                .map(|section| self.expand_section(section, &keywords, host, &sites, &references)),
        )
        .await?;

        let now = Utc::now();
        let new = NewPost {
            title: outline::post_title(&outline_html, &keywords),
            content: outline::assemble_post(&outline_html, &bodies, &keywords),
            slug: outline::slug_for(&keywords, now.timestamp_millis()),
            author: self.config.author.clone(),
            host_key: host.to_string(),
        };
        new.validated()?;
        self.insert_with_fresh_slug(new).await
    }

    /// Timestamp slugs collide when two posts share a first keyword and a
    /// millisecond; retry those with a numeric suffix.
    async fn insert_with_fresh_slug(&self, new: NewPost) -> Result<Post> {
        let base = new.slug.clone();
        let mut attempt = 1;
        loop {
            let mut candidate = new.clone();
            if attempt > 1 {
                candidate.slug = format!("{base}-{attempt}");
            }
            match self.store.insert_post(candidate.into_post(Utc::now())).await {
                Err(e)
                    if attempt < SLUG_ATTEMPTS
                        && HostpressError::kind_of(&e) == Some(ErrorKind::Conflict) =>
                {
                    warn!(slug = %base, attempt, "slug taken, retrying");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn expand_section(
        &self,
        section: &str,
        keywords: &[String],
        host: &str,
        sites: &[String],
        references: &[String],
    ) -> Result<String> {
        let reply = self
            .llm
            .complete(
                outline::SUBSECTIONS_SYSTEM,
                &outline::subsections_prompt(section, keywords, self.config.subsection_range),
            )
            .await?;
        let titles = outline::subsection_titles(&reply);
        debug!(section, subsections = titles.len(), "expanding section");

        let bodies = try_join_all(titles.iter().map(|title| {
            let prompt =
                outline::subsection_prompt(title, section, keywords, references, host, sites);
            async move { self.llm.complete(outline::WRITER_SYSTEM, &prompt).await }
        }))
        .await?;

        Ok(outline::section_html(section, &bodies))
    }

    fn rng(&self) -> std::sync::MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Between `min` and `max` distinct items, bounded by the list length.
fn pick<R: Rng>(rng: &mut R, items: &[String], min: usize, max: usize) -> Vec<String> {
    let max = max.min(items.len());
    let min = min.min(max);
    let count = rng.gen_range(min..=max);
    items.choose_multiple(rng, count).cloned().collect()
}

/// `https://` unless the entry already names a scheme.
pub fn site_url(entry: &str) -> String {
    let entry = entry.trim();
    if entry.contains("://") {
        entry.to_string()
    } else {
        format!("https://{entry}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn scheme_is_added_only_when_missing() {
        assert_eq!(site_url("lovevery.com/products/"), "https://lovevery.com/products/");
        assert_eq!(site_url("https://learn.lovevery.com/"), "https://learn.lovevery.com/");
        assert_eq!(site_url("http://localhost:8080"), "http://localhost:8080");
    }

    #[test]
    fn pick_respects_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let items = strings(&["a", "b", "c", "d", "e", "f"]);
        for _ in 0..50 {
            let picked = pick(&mut rng, &items, 2, 4);
            assert!((2..=4).contains(&picked.len()));
            let mut unique = picked.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), picked.len());
        }
    }

    #[test]
    fn pick_from_short_lists() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(pick(&mut rng, &strings(&["only"]), 2, 4), strings(&["only"]));
        assert!(pick(&mut rng, &[], 1, 2).is_empty());
    }
}
