use async_trait::async_trait;
use anyhow::Result;
use hostpress_core::HostKey;

use crate::models::{Domain, Post};

/// The tenant-scoped document store seam.
///
/// Every post read is filtered by `host`; writes take the key from the
/// record itself. Opened once per process and shared as `Arc<dyn BlogStore>`.
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Posts for one tenant, newest first. `limit = None` means no limit.
    async fn list_posts(&self, host: &HostKey, skip: u64, limit: Option<u64>) -> Result<Vec<Post>>;

    async fn count_posts(&self, host: &HostKey) -> Result<u64>;

    /// `None` both when the slug is unknown and when it belongs to another tenant.
    async fn find_post_by_slug(&self, host: &HostKey, slug: &str) -> Result<Option<Post>>;

    /// Fails with `ConflictError` when the slug already exists under any tenant.
    async fn insert_post(&self, post: Post) -> Result<Post>;

    async fn list_domains(&self) -> Result<Vec<Domain>>;

    async fn find_domain(&self, host: &HostKey) -> Result<Option<Domain>>;

    /// Fails with `ConflictError` when the host key is taken; the existing
    /// record is left untouched.
    async fn insert_domain(&self, domain: Domain) -> Result<Domain>;

    /// Deletes every post of `host`, then the domain, as one unit.
    /// Returns the removed domain (if any) and the number of posts removed.
    async fn delete_domain(&self, host: &HostKey) -> Result<(Option<Domain>, u64)>;

    /// Drop all posts and domains.
    async fn clear(&self) -> Result<()>;

    /// Release the handle. Later calls fail with `Unavailable`.
    async fn close(&self) -> Result<()>;
}
