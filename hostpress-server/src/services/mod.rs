use std::sync::Arc;

use hostpress_core::{HostpressApp, ServiceHandle, TenantService};
use hostpress_store::{Domain, NewDomain, NewPost, Post};

pub mod types;
pub use types::{HostpressParams, ServerState};

pub mod domains;
pub mod posts;

use domains::{DomainParams, DomainsService};
use posts::{PostParams, PostsService};

pub struct Services {
    pub posts: ServiceHandle<Post, NewPost, PostParams>,
    pub domains: ServiceHandle<Domain, NewDomain, DomainParams>,
}

pub fn configure(app: &HostpressApp, state: &ServerState) -> Services {
    let posts_svc: Arc<dyn TenantService<Post, NewPost, PostParams>> =
        Arc::new(PostsService::new(Arc::clone(&state.store)));
    let domains_svc: Arc<dyn TenantService<Domain, NewDomain, DomainParams>> =
        Arc::new(DomainsService::new(Arc::clone(&state.store)));

    Services {
        posts: posts::posts_shared::register_hooks(app.service("posts", posts_svc)),
        domains: domains::domains_shared::register_hooks(app.service("domains", domains_svc)),
    }
}
