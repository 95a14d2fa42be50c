use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use hostpress_core::errors::HostpressError;
use hostpress_core::tenant::TenantContext;
use hostpress_core::{HostKey, ServiceCapabilities, TenantService};
use hostpress_store::{BlogStore, Domain, NewDomain};

use super::domains_shared;
use super::DomainParams;

pub struct DomainsService {
    pub store: Arc<dyn BlogStore>,
}

impl DomainsService {
    pub fn new(store: Arc<dyn BlogStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TenantService<Domain, NewDomain, DomainParams> for DomainsService {
    fn capabilities(&self) -> ServiceCapabilities {
        domains_shared::capabilities()
    }

    async fn find(&self, _ctx: &TenantContext, _params: DomainParams) -> Result<Vec<Domain>> {
        self.store.list_domains().await
    }

    async fn create(&self, _ctx: &TenantContext, data: NewDomain, _params: DomainParams) -> Result<Domain> {
        self.store.insert_domain(data.into_domain(Utc::now())).await
    }

    /// Delete a tenant and every post under it. The key comes from the path
    /// or from `?domain=`.
    async fn remove(&self, _ctx: &TenantContext, id: Option<&str>, params: DomainParams) -> Result<Domain> {
        let key = id
            .filter(|s| !s.is_empty())
            .or_else(|| params.domain())
            .ok_or_else(|| HostpressError::validation("Domain parameter is required").into_anyhow())?;

        let host = HostKey::from(key);
        let (domain, posts_removed) = self.store.delete_domain(&host).await?;

        match domain {
            Some(domain) => {
                tracing::info!(host = %host, posts_removed, "domain deleted");
                Ok(domain)
            }
            None => {
                if posts_removed > 0 {
                    tracing::warn!(host = %host, posts_removed, "purged posts of an unregistered domain");
                }
                Err(HostpressError::not_found("Domain not found").into_anyhow())
            }
        }
    }
}
