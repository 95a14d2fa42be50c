use std::sync::Arc;

use hostpress_store::BlogStore;

pub type HostpressParams = hostpress_axum::params::RestParams;

/// Shared handles the services are built from.
#[derive(Clone)]
pub struct ServerState {
    pub store: Arc<dyn BlogStore>,
}

impl ServerState {
    pub fn new(store: Arc<dyn BlogStore>) -> Self {
        Self { store }
    }
}
