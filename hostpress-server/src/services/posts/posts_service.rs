use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use hostpress_core::errors::HostpressError;
use hostpress_core::tenant::TenantContext;
use hostpress_core::{ServiceCapabilities, TenantService};
use hostpress_store::{BlogStore, NewPost, Post};

use super::posts_shared;
use super::PostParams;

/// Tenant-scoped posts. Reads are keyed by the request host; writes carry
/// their own `hostKey`.
pub struct PostsService {
    pub store: Arc<dyn BlogStore>,
}

impl PostsService {
    pub fn new(store: Arc<dyn BlogStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TenantService<Post, NewPost, PostParams> for PostsService {
    fn capabilities(&self) -> ServiceCapabilities {
        posts_shared::capabilities()
    }

    async fn find(&self, ctx: &TenantContext, params: PostParams) -> Result<Vec<Post>> {
        let window = params.rest.pagination;
        self.store
            .list_posts(&ctx.host, window.skip(), Some(window.limit()))
            .await
    }

    async fn count(&self, ctx: &TenantContext, _params: PostParams) -> Result<u64> {
        self.store.count_posts(&ctx.host).await
    }

    /// `id` is the slug.
    async fn get(&self, ctx: &TenantContext, slug: &str, _params: PostParams) -> Result<Post> {
        self.store
            .find_post_by_slug(&ctx.host, slug)
            .await?
            .ok_or_else(|| HostpressError::not_found("Post not found").into_anyhow())
    }

    async fn create(&self, _ctx: &TenantContext, data: NewPost, _params: PostParams) -> Result<Post> {
        self.store.insert_post(data.into_post(Utc::now())).await
    }
}
