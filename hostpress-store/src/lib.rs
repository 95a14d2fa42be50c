//! hostpress-store: typed records and the tenant-scoped store.

pub mod memory;
pub mod models;
pub mod sql;
pub mod store;

use std::sync::Arc;

use anyhow::Result;

pub use memory::MemoryStore;
pub use models::{Domain, NewDomain, NewPost, Post};
pub use sql::SqlStore;
pub use store::BlogStore;

/// Open the store named by `database`: `memory` / `:memory:` selects the
/// in-process store, anything else is a libSQL file path.
pub async fn open(database: &str) -> Result<Arc<dyn BlogStore>> {
    match database.trim() {
        "memory" | ":memory:" => {
            tracing::info!("using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        path => Ok(Arc::new(SqlStore::open(path).await?)),
    }
}
