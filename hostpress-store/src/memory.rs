use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use hostpress_core::{bail_hp, HostKey};
use tokio::sync::RwLock;

use crate::models::{Domain, Post};
use crate::store::BlogStore;

#[derive(Default)]
struct MemoryState {
    /// Per tenant, in insertion order.
    posts_by_host: HashMap<HostKey, Vec<Post>>,
    slugs: HashSet<String>,
    domains: HashMap<HostKey, Domain>,
}

/// In-process store, tenant-partitioned maps behind one lock.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            bail_hp!(unavailable, "store is closed");
        }
        Ok(())
    }
}

fn newest_first(posts: &[Post]) -> Vec<&Post> {
    let mut out: Vec<(usize, &Post)> = posts.iter().enumerate().collect();
    // ties on created_at: later insertion first
    out.sort_by(|(ia, a), (ib, b)| b.created_at.cmp(&a.created_at).then(ib.cmp(ia)));
    out.into_iter().map(|(_, p)| p).collect()
}

#[async_trait]
impl BlogStore for MemoryStore {
    async fn list_posts(&self, host: &HostKey, skip: u64, limit: Option<u64>) -> Result<Vec<Post>> {
        self.check_open()?;
        let state = self.state.read().await;
        let Some(posts) = state.posts_by_host.get(host) else {
            return Ok(vec![]);
        };

        let iter = newest_first(posts).into_iter().skip(skip as usize).cloned();
        Ok(match limit {
            Some(n) => iter.take(n as usize).collect(),
            None => iter.collect(),
        })
    }

    async fn count_posts(&self, host: &HostKey) -> Result<u64> {
        self.check_open()?;
        let state = self.state.read().await;
        Ok(state.posts_by_host.get(host).map_or(0, |p| p.len() as u64))
    }

    async fn find_post_by_slug(&self, host: &HostKey, slug: &str) -> Result<Option<Post>> {
        self.check_open()?;
        let state = self.state.read().await;
        Ok(state
            .posts_by_host
            .get(host)
            .and_then(|posts| posts.iter().find(|p| p.slug == slug))
            .cloned())
    }

    async fn insert_post(&self, post: Post) -> Result<Post> {
        self.check_open()?;
        let mut state = self.state.write().await;
        if state.slugs.contains(&post.slug) {
            bail_hp!(conflict, "Post with slug '{}' already exists", post.slug);
        }
        state.slugs.insert(post.slug.clone());
        state
            .posts_by_host
            .entry(post.host_key.clone())
            .or_default()
            .push(post.clone());
        Ok(post)
    }

    async fn list_domains(&self) -> Result<Vec<Domain>> {
        self.check_open()?;
        let state = self.state.read().await;
        let mut out: Vec<Domain> = state.domains.values().cloned().collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.host_key.cmp(&b.host_key)));
        Ok(out)
    }

    async fn find_domain(&self, host: &HostKey) -> Result<Option<Domain>> {
        self.check_open()?;
        Ok(self.state.read().await.domains.get(host).cloned())
    }

    async fn insert_domain(&self, domain: Domain) -> Result<Domain> {
        self.check_open()?;
        let mut state = self.state.write().await;
        if state.domains.contains_key(&domain.host_key) {
            bail_hp!(conflict, "Domain '{}' already exists", domain.host_key);
        }
        state.domains.insert(domain.host_key.clone(), domain.clone());
        Ok(domain)
    }

    async fn delete_domain(&self, host: &HostKey) -> Result<(Option<Domain>, u64)> {
        self.check_open()?;
        let mut state = self.state.write().await;

        let removed_posts = state.posts_by_host.remove(host).unwrap_or_default();
        for post in &removed_posts {
            state.slugs.remove(&post.slug);
        }
        let domain = state.domains.remove(host);

        Ok((domain, removed_posts.len() as u64))
    }

    async fn clear(&self) -> Result<()> {
        self.check_open()?;
        *self.state.write().await = MemoryState::default();
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
