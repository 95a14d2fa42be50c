use anyhow::Result;
use async_trait::async_trait;
use hostpress_core::errors::HostpressError;
use hostpress_core::hooks::{BeforeHook, HookContext};
use hostpress_store::{Domain, NewDomain};

use super::DomainParams;

type DomainsContext = HookContext<Domain, NewDomain, DomainParams>;

pub struct ValidateNewDomain;

#[async_trait]
impl BeforeHook<Domain, NewDomain, DomainParams> for ValidateNewDomain {
    async fn run(&self, ctx: &mut DomainsContext) -> Result<()> {
        let Some(data) = ctx.data.as_ref() else {
            return Ok(());
        };
        data.validated()
    }
}

/// Domain writes are only accepted from a local host while
/// `admin.local_only` is on (the default).
pub struct AdminLocalOnly;

#[async_trait]
impl BeforeHook<Domain, NewDomain, DomainParams> for AdminLocalOnly {
    async fn run(&self, ctx: &mut DomainsContext) -> Result<()> {
        let local_only = ctx.config.get_bool("admin.local_only").unwrap_or(true);
        if local_only && !ctx.tenant.host.is_local() {
            tracing::warn!(host = %ctx.tenant.host, method = ctx.method.as_str(), "rejected admin call");
            return Err(HostpressError::unauthorized("Unauthorized").into_anyhow());
        }
        Ok(())
    }
}
