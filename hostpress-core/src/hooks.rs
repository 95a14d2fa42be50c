use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::ConfigSnapshot;
use crate::service::ServiceMethodKind;
use crate::tenant::TenantContext;

/// What a service call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum HookResult<R> {
    One(R),
    Many(Vec<R>),
    Count(u64),
}

/// Context passed to hooks.
///
/// R = record type
/// D = create payload
/// P = params type (query, headers, pagination)
#[derive(Debug)]
pub struct HookContext<R, D, P> {
    pub tenant: TenantContext,
    pub method: ServiceMethodKind,
    pub service: String,
    pub params: P,
    /// Input payload for `create`. Before hooks may rewrite it.
    pub data: Option<D>,
    pub id: Option<String>,
    /// Output, set by the service call and visible to after hooks.
    pub result: Option<HookResult<R>>,
    /// Failure, visible to error hooks. Clearing it recovers the call.
    pub error: Option<anyhow::Error>,
    pub config: ConfigSnapshot,
}

impl<R, D, P> HookContext<R, D, P> {
    pub fn new(
        tenant: TenantContext,
        method: ServiceMethodKind,
        service: impl Into<String>,
        params: P,
        config: ConfigSnapshot,
    ) -> Self {
        Self {
            tenant,
            method,
            service: service.into(),
            params,
            data: None,
            id: None,
            result: None,
            error: None,
            config,
        }
    }
}

#[async_trait]
pub trait BeforeHook<R, D, P>: Send + Sync {
    async fn run(&self, ctx: &mut HookContext<R, D, P>) -> Result<()>;
}

#[async_trait]
pub trait AfterHook<R, D, P>: Send + Sync {
    async fn run(&self, ctx: &mut HookContext<R, D, P>) -> Result<()>;
}

#[async_trait]
pub trait ErrorHook<R, D, P>: Send + Sync {
    async fn run(&self, ctx: &mut HookContext<R, D, P>) -> Result<()>;
}

/// Hook registrations for one service, Feathers style:
/// `all` hooks run first, then the method-specific ones, each in
/// registration order.
pub struct ServiceHooks<R, D, P> {
    pub(crate) before_all: Vec<Arc<dyn BeforeHook<R, D, P>>>,
    pub(crate) before_by_method: HashMap<ServiceMethodKind, Vec<Arc<dyn BeforeHook<R, D, P>>>>,
    pub(crate) after_all: Vec<Arc<dyn AfterHook<R, D, P>>>,
    pub(crate) after_by_method: HashMap<ServiceMethodKind, Vec<Arc<dyn AfterHook<R, D, P>>>>,
    pub(crate) error_all: Vec<Arc<dyn ErrorHook<R, D, P>>>,
    pub(crate) error_by_method: HashMap<ServiceMethodKind, Vec<Arc<dyn ErrorHook<R, D, P>>>>,
}

impl<R, D, P> Default for ServiceHooks<R, D, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, D, P> ServiceHooks<R, D, P> {
    pub fn new() -> Self {
        Self {
            before_all: Vec::new(),
            before_by_method: HashMap::new(),
            after_all: Vec::new(),
            after_by_method: HashMap::new(),
            error_all: Vec::new(),
            error_by_method: HashMap::new(),
        }
    }

    pub fn before_all(&mut self, hook: Arc<dyn BeforeHook<R, D, P>>) -> &mut Self {
        self.before_all.push(hook);
        self
    }

    pub fn before(
        &mut self,
        method: ServiceMethodKind,
        hook: Arc<dyn BeforeHook<R, D, P>>,
    ) -> &mut Self {
        self.before_by_method.entry(method).or_default().push(hook);
        self
    }

    pub fn after_all(&mut self, hook: Arc<dyn AfterHook<R, D, P>>) -> &mut Self {
        self.after_all.push(hook);
        self
    }

    pub fn after(
        &mut self,
        method: ServiceMethodKind,
        hook: Arc<dyn AfterHook<R, D, P>>,
    ) -> &mut Self {
        self.after_by_method.entry(method).or_default().push(hook);
        self
    }

    pub fn before_create(&mut self, hook: Arc<dyn BeforeHook<R, D, P>>) -> &mut Self {
        self.before(ServiceMethodKind::Create, hook)
    }

    pub fn before_remove(&mut self, hook: Arc<dyn BeforeHook<R, D, P>>) -> &mut Self {
        self.before(ServiceMethodKind::Remove, hook)
    }

    pub fn after_create(&mut self, hook: Arc<dyn AfterHook<R, D, P>>) -> &mut Self {
        self.after(ServiceMethodKind::Create, hook)
    }

    pub fn error_all(&mut self, hook: Arc<dyn ErrorHook<R, D, P>>) -> &mut Self {
        self.error_all.push(hook);
        self
    }

    pub fn error(
        &mut self,
        method: ServiceMethodKind,
        hook: Arc<dyn ErrorHook<R, D, P>>,
    ) -> &mut Self {
        self.error_by_method.entry(method).or_default().push(hook);
        self
    }
}

pub(crate) fn collect_method_hooks<H: ?Sized>(
    all: &[Arc<H>],
    by_method: &HashMap<ServiceMethodKind, Vec<Arc<H>>>,
    method: ServiceMethodKind,
) -> Vec<Arc<H>> {
    let mut out: Vec<Arc<H>> = all.to_vec();
    if let Some(v) = by_method.get(&method) {
        out.extend(v.iter().cloned());
    }
    out
}
