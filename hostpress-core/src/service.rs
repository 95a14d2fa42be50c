use async_trait::async_trait;
use anyhow::Result;

use crate::errors::HostpressError;
use crate::tenant::TenantContext;

/// Standard service methods.
///
/// `Count` exists so a paginated listing can ask for its total
/// independently of the page fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceMethodKind {
    Find,
    Count,
    Get,
    Create,
    Remove,
}

impl ServiceMethodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceMethodKind::Find => "find",
            ServiceMethodKind::Count => "count",
            ServiceMethodKind::Get => "get",
            ServiceMethodKind::Create => "create",
            ServiceMethodKind::Remove => "remove",
        }
    }
}

/// Capabilities describe which methods a service exposes to transports.
///
/// The axum adapter mounts only the allowed routes.
#[derive(Debug, Clone)]
pub struct ServiceCapabilities {
    pub allowed_methods: Vec<ServiceMethodKind>,
}

impl ServiceCapabilities {
    pub fn all() -> Self {
        use ServiceMethodKind::*;
        Self {
            allowed_methods: vec![Find, Count, Get, Create, Remove],
        }
    }

    pub fn from_methods(methods: Vec<ServiceMethodKind>) -> Self {
        Self {
            allowed_methods: methods,
        }
    }

    pub fn allows(&self, method: ServiceMethodKind) -> bool {
        self.allowed_methods.contains(&method)
    }
}

fn not_implemented(method: &str) -> anyhow::Error {
    HostpressError::not_implemented(format!("Method not implemented: {method}")).into_anyhow()
}

/// Core tenant-scoped service trait.
///
/// - `R` record type returned to callers
/// - `D` payload accepted by `create`
/// - `P` per-call params (query, headers, pagination)
///
/// All methods default to "Method not implemented", so a service
/// overrides only what it supports.
#[async_trait]
pub trait TenantService<R, D, P>: Send + Sync
where
    R: Send + 'static,
    D: Send + 'static,
    P: Send + 'static,
{
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::all()
    }

    /// Find many records (one page when params carry a window).
    async fn find(&self, _ctx: &TenantContext, _params: P) -> Result<Vec<R>> {
        Err(not_implemented("find"))
    }

    /// Total number of records `find` would page through.
    async fn count(&self, _ctx: &TenantContext, _params: P) -> Result<u64> {
        Err(not_implemented("count"))
    }

    async fn get(&self, _ctx: &TenantContext, _id: &str, _params: P) -> Result<R> {
        Err(not_implemented("get"))
    }

    async fn create(&self, _ctx: &TenantContext, _data: D, _params: P) -> Result<R> {
        Err(not_implemented("create"))
    }

    /// Remove a record. `id` may be `None` when the key travels in params.
    async fn remove(&self, _ctx: &TenantContext, _id: Option<&str>, _params: P) -> Result<R> {
        Err(not_implemented("remove"))
    }
}
