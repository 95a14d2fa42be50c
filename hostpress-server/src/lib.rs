//! hostpress-server: the multi-tenant blog HTTP service.

pub mod app;
pub mod hooks;
pub mod routes;
pub mod services;

use std::sync::Arc;

use hostpress_axum::{axum, AxumApp};
use hostpress_core::HostpressApp;
use hostpress_store::BlogStore;

use crate::routes::SiteState;
use crate::services::ServerState;

/// Wire services, site routes and health onto `app`, backed by `store`.
pub fn build(app: HostpressApp, store: Arc<dyn BlogStore>) -> AxumApp {
    let state = ServerState::new(Arc::clone(&store));
    let svcs = services::configure(&app, &state);

    let site = routes::site_router(SiteState {
        store,
        app: app.clone(),
    });

    axum(app)
        .use_service("/api/posts", svcs.posts)
        .use_service("/api/admin/domains", svcs.domains)
        .use_router("/", site)
        .service("/health", || async { "ok" })
}
