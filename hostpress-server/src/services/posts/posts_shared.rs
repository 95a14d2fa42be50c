use std::sync::Arc;

use hostpress_core::{ServiceCapabilities, ServiceHandle, ServiceMethodKind};
use hostpress_store::{NewPost, Post};

use super::PostParams;

pub fn capabilities() -> ServiceCapabilities {
    ServiceCapabilities::from_methods(vec![
        ServiceMethodKind::Find,
        ServiceMethodKind::Count,
        ServiceMethodKind::Get,
        ServiceMethodKind::Create,
    ])
}

pub fn register_hooks(
    posts: ServiceHandle<Post, NewPost, PostParams>,
) -> ServiceHandle<Post, NewPost, PostParams> {
    posts.hooks(|h| {
        crate::hooks::log_calls(h);

        h.before_create(Arc::new(super::posts_hooks::ValidateNewPost));
        h.before_create(Arc::new(super::posts_hooks::FlagCrossTenantWrite));
    })
}
