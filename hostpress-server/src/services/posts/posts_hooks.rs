use anyhow::Result;
use async_trait::async_trait;
use hostpress_core::hooks::{BeforeHook, HookContext};
use hostpress_store::{NewPost, Post};

use super::PostParams;

type PostsContext = HookContext<Post, NewPost, PostParams>;

pub struct ValidateNewPost;

#[async_trait]
impl BeforeHook<Post, NewPost, PostParams> for ValidateNewPost {
    async fn run(&self, ctx: &mut PostsContext) -> Result<()> {
        let Some(data) = ctx.data.as_ref() else {
            return Ok(());
        };
        data.validated()
    }
}

/// Writes name their tenant in the body. A post addressed to a tenant other
/// than the calling host is accepted, but logged.
pub struct FlagCrossTenantWrite;

#[async_trait]
impl BeforeHook<Post, NewPost, PostParams> for FlagCrossTenantWrite {
    async fn run(&self, ctx: &mut PostsContext) -> Result<()> {
        let Some(data) = ctx.data.as_ref() else {
            return Ok(());
        };

        if data.host_key != ctx.tenant.host.as_str() {
            tracing::warn!(
                request_host = %ctx.tenant.host,
                host_key = %data.host_key,
                slug = %data.slug,
                "post written for a different tenant than the request host"
            );
        }
        Ok(())
    }
}
