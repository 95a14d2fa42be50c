use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;

use crate::config::{ConfigSnapshot, HostpressConfig};
use crate::errors::HostpressError;
use crate::hooks::{collect_method_hooks, AfterHook, BeforeHook, ErrorHook};
use crate::paginate::{PaginateParams, Paginated};
use crate::{HookContext, HookResult, ServiceHooks, ServiceMethodKind, TenantContext, TenantService};

struct HostpressAppInner {
    config: RwLock<HostpressConfig>,
}

/// HostpressApp is the central application container.
///
/// Framework-agnostic. Holds the config and hands out [`ServiceHandle`]s;
/// each handle owns its own hook registrations.
#[derive(Clone)]
pub struct HostpressApp {
    inner: Arc<HostpressAppInner>,
}

impl Default for HostpressApp {
    fn default() -> Self {
        Self::new()
    }
}

impl HostpressApp {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HostpressAppInner {
                config: RwLock::new(HostpressConfig::new()),
            }),
        }
    }

    /// Feathers: `app.set(key, value)`
    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.inner.config.write().set(key, value);
    }

    /// Feathers: `app.get(key)`
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.config.read().get(key).map(|v| v.to_string())
    }

    /// Apply `PREFIX__A__B` environment pairs, see [`HostpressConfig::load_env`].
    pub fn load_env<I>(&self, prefix: &str, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.inner.config.write().load_env(prefix, vars);
    }

    pub fn config_snapshot(&self) -> ConfigSnapshot {
        self.inner.config.read().snapshot()
    }

    /// Feathers: `app.use(name, service)`; returns the handle to call through.
    pub fn service<R, D, P>(
        &self,
        name: impl Into<String>,
        service: Arc<dyn TenantService<R, D, P>>,
    ) -> ServiceHandle<R, D, P>
    where
        R: Send + 'static,
        D: Send + 'static,
        P: Send + Sync + Clone + 'static,
    {
        ServiceHandle {
            app: self.clone(),
            name: name.into(),
            service,
            hooks: Arc::new(RwLock::new(ServiceHooks::new())),
        }
    }
}

type HooksForMethod<R, D, P> = (
    Vec<Arc<dyn BeforeHook<R, D, P>>>,
    Vec<Arc<dyn AfterHook<R, D, P>>>,
    Vec<Arc<dyn ErrorHook<R, D, P>>>,
);

/// A registered service wrapped in its hook pipeline.
///
/// Every call runs: before hooks, the service method, after hooks. If any
/// step fails the error hooks run; one of them may clear `ctx.error` to
/// recover.
pub struct ServiceHandle<R, D, P>
where
    R: Send + 'static,
    D: Send + 'static,
    P: Send + Sync + Clone + 'static,
{
    app: HostpressApp,
    name: String,
    service: Arc<dyn TenantService<R, D, P>>,
    hooks: Arc<RwLock<ServiceHooks<R, D, P>>>,
}

impl<R, D, P> Clone for ServiceHandle<R, D, P>
where
    R: Send + 'static,
    D: Send + 'static,
    P: Send + Sync + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            app: self.app.clone(),
            name: self.name.clone(),
            service: Arc::clone(&self.service),
            hooks: Arc::clone(&self.hooks),
        }
    }
}

impl<R, D, P> ServiceHandle<R, D, P>
where
    R: Send + 'static,
    D: Send + 'static,
    P: Send + Sync + Clone + 'static,
{
    /// Feathers: `app.service("x").hooks({ ... })`
    pub fn hooks<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut ServiceHooks<R, D, P>),
    {
        {
            let mut hooks = self.hooks.write();
            f(&mut hooks);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inner(&self) -> &Arc<dyn TenantService<R, D, P>> {
        &self.service
    }

    pub fn app(&self) -> &HostpressApp {
        &self.app
    }

    fn collect_hooks_for_method(&self, method: ServiceMethodKind) -> HooksForMethod<R, D, P> {
        let h = self.hooks.read();
        (
            collect_method_hooks(&h.before_all, &h.before_by_method, method),
            collect_method_hooks(&h.after_all, &h.after_by_method, method),
            collect_method_hooks(&h.error_all, &h.error_by_method, method),
        )
    }

    fn context(&self, tenant: TenantContext, method: ServiceMethodKind, params: P) -> HookContext<R, D, P> {
        HookContext::new(tenant, method, self.name.clone(), params, self.app.config_snapshot())
    }

    async fn call_service(&self, ctx: &mut HookContext<R, D, P>) -> Result<()> {
        let params = ctx.params.clone();
        let result = match ctx.method {
            ServiceMethodKind::Find => HookResult::Many(self.service.find(&ctx.tenant, params).await?),
            ServiceMethodKind::Count => {
                HookResult::Count(self.service.count(&ctx.tenant, params).await?)
            }
            ServiceMethodKind::Get => {
                let id = ctx
                    .id
                    .clone()
                    .ok_or_else(|| HostpressError::general("get() requires an id").into_anyhow())?;
                HookResult::One(self.service.get(&ctx.tenant, &id, params).await?)
            }
            ServiceMethodKind::Create => {
                let data = ctx
                    .data
                    .take()
                    .ok_or_else(|| HostpressError::general("create() requires data").into_anyhow())?;
                HookResult::One(self.service.create(&ctx.tenant, data, params).await?)
            }
            ServiceMethodKind::Remove => {
                HookResult::One(self.service.remove(&ctx.tenant, ctx.id.as_deref(), params).await?)
            }
        };
        ctx.result = Some(result);
        Ok(())
    }

    /// Core pipeline: before -> service call -> after, then error hooks on failure.
    async fn run_pipeline(&self, mut ctx: HookContext<R, D, P>) -> Result<HookContext<R, D, P>> {
        let (before, after, error) = self.collect_hooks_for_method(ctx.method);

        let res: Result<()> = async {
            for h in &before {
                h.run(&mut ctx).await?;
            }

            self.call_service(&mut ctx).await?;

            for h in &after {
                h.run(&mut ctx).await?;
            }
            Ok(())
        }
        .await;

        if let Err(e) = res {
            ctx.error = Some(e);

            for h in &error {
                if let Err(hook_err) = h.run(&mut ctx).await {
                    tracing::warn!(
                        service = %self.name,
                        method = ctx.method.as_str(),
                        error = %hook_err,
                        "error hook failed"
                    );
                }
            }

            if let Some(err) = ctx.error.take() {
                return Err(err);
            }
        }

        Ok(ctx)
    }

    fn unexpected(&self, method: ServiceMethodKind, got: &str) -> anyhow::Error {
        HostpressError::general(format!(
            "{}.{}() produced {got} unexpectedly",
            self.name,
            method.as_str()
        ))
        .into_anyhow()
    }

    fn expect_one(&self, method: ServiceMethodKind, result: Option<HookResult<R>>) -> Result<R> {
        match result {
            Some(HookResult::One(v)) => Ok(v),
            Some(HookResult::Many(_)) => Err(self.unexpected(method, "HookResult::Many")),
            Some(HookResult::Count(_)) => Err(self.unexpected(method, "HookResult::Count")),
            None => Err(self.unexpected(method, "no result")),
        }
    }

    pub async fn find(&self, tenant: TenantContext, params: P) -> Result<Vec<R>> {
        let method = ServiceMethodKind::Find;
        let ctx = self.run_pipeline(self.context(tenant, method, params)).await?;

        match ctx.result {
            Some(HookResult::Many(v)) => Ok(v),
            Some(HookResult::One(_)) => Err(self.unexpected(method, "HookResult::One")),
            Some(HookResult::Count(_)) => Err(self.unexpected(method, "HookResult::Count")),
            None => Ok(vec![]),
        }
    }

    pub async fn count(&self, tenant: TenantContext, params: P) -> Result<u64> {
        let method = ServiceMethodKind::Count;
        let ctx = self.run_pipeline(self.context(tenant, method, params)).await?;

        match ctx.result {
            Some(HookResult::Count(n)) => Ok(n),
            Some(HookResult::Many(v)) => Ok(v.len() as u64),
            Some(HookResult::One(_)) => Err(self.unexpected(method, "HookResult::One")),
            None => Ok(0),
        }
    }

    pub async fn get(&self, tenant: TenantContext, id: &str, params: P) -> Result<R> {
        let method = ServiceMethodKind::Get;
        let mut ctx = self.context(tenant, method, params);
        ctx.id = Some(id.to_string());

        let ctx = self.run_pipeline(ctx).await?;
        self.expect_one(method, ctx.result)
    }

    pub async fn create(&self, tenant: TenantContext, data: D, params: P) -> Result<R> {
        let method = ServiceMethodKind::Create;
        let mut ctx = self.context(tenant, method, params);
        ctx.data = Some(data);

        let ctx = self.run_pipeline(ctx).await?;
        self.expect_one(method, ctx.result)
    }

    pub async fn remove(&self, tenant: TenantContext, id: Option<&str>, params: P) -> Result<R> {
        let method = ServiceMethodKind::Remove;
        let mut ctx = self.context(tenant, method, params);
        ctx.id = id.map(|s| s.to_string());

        let ctx = self.run_pipeline(ctx).await?;
        self.expect_one(method, ctx.result)
    }
}

impl<R, D, P> ServiceHandle<R, D, P>
where
    R: Send + 'static,
    D: Send + 'static,
    P: PaginateParams + Send + Sync + Clone + 'static,
{
    /// A page plus the total, as two independent calls through the pipeline.
    ///
    /// The count and the page are not read atomically; a concurrent write
    /// can make `total` disagree with the items by the size of that write.
    pub async fn find_page(&self, tenant: TenantContext, params: P) -> Result<Paginated<R>> {
        let window = params.pagination().ok_or_else(|| {
            HostpressError::general(format!("{}.find_page() requires a pagination window", self.name))
                .into_anyhow()
        })?;

        let total = self.count(tenant.clone(), params.clone()).await?;
        let items = self.find(tenant, params).await?;
        Ok(Paginated::new(items, total, window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::paginate::Pagination;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct Numbers;

    #[async_trait]
    impl TenantService<u32, u32, Option<Pagination>> for Numbers {
        async fn find(&self, _ctx: &TenantContext, params: Option<Pagination>) -> Result<Vec<u32>> {
            let all: Vec<u32> = (1..=7).collect();
            Ok(match params {
                Some(w) => all
                    .into_iter()
                    .skip(w.skip() as usize)
                    .take(w.limit() as usize)
                    .collect(),
                None => all,
            })
        }

        async fn count(&self, _ctx: &TenantContext, _params: Option<Pagination>) -> Result<u64> {
            Ok(7)
        }

        async fn create(&self, _ctx: &TenantContext, data: u32, _params: Option<Pagination>) -> Result<u32> {
            if data == 0 {
                return Err(HostpressError::conflict("zero already exists").into_anyhow());
            }
            Ok(data)
        }
    }

    struct Record {
        log: Arc<Mutex<Vec<String>>>,
        label: &'static str,
    }

    #[async_trait]
    impl BeforeHook<u32, u32, Option<Pagination>> for Record {
        async fn run(&self, ctx: &mut HookContext<u32, u32, Option<Pagination>>) -> Result<()> {
            self.log.lock().push(format!("{}:{}", self.label, ctx.method.as_str()));
            if let Some(d) = ctx.data.as_mut() {
                *d += 100;
            }
            Ok(())
        }
    }

    #[async_trait]
    impl AfterHook<u32, u32, Option<Pagination>> for Record {
        async fn run(&self, ctx: &mut HookContext<u32, u32, Option<Pagination>>) -> Result<()> {
            self.log.lock().push(format!("{}:{}", self.label, ctx.method.as_str()));
            Ok(())
        }
    }

    struct Recover;

    #[async_trait]
    impl ErrorHook<u32, u32, Option<Pagination>> for Recover {
        async fn run(&self, ctx: &mut HookContext<u32, u32, Option<Pagination>>) -> Result<()> {
            if HostpressError::kind_of(ctx.error.as_ref().unwrap()) == Some(ErrorKind::Conflict) {
                ctx.error = None;
                ctx.result = Some(HookResult::One(0));
            }
            Ok(())
        }
    }

    fn numbers() -> ServiceHandle<u32, u32, Option<Pagination>> {
        let svc: Arc<dyn TenantService<u32, u32, Option<Pagination>>> = Arc::new(Numbers);
        HostpressApp::new().service("numbers", svc)
    }

    #[tokio::test]
    async fn hooks_run_in_order_and_can_rewrite_data() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let svc = numbers().hooks(|h| {
            h.before_all(Arc::new(Record { log: log.clone(), label: "before-all" }));
            h.before(
                ServiceMethodKind::Create,
                Arc::new(Record { log: log.clone(), label: "before" }),
            );
            h.after(
                ServiceMethodKind::Create,
                Arc::new(Record { log: log.clone(), label: "after" }),
            );
        });

        let created = svc.create(TenantContext::new("a"), 1, None).await.unwrap();
        assert_eq!(created, 201);
        assert_eq!(
            *log.lock(),
            vec!["before-all:create", "before:create", "after:create"]
        );
    }

    #[tokio::test]
    async fn errors_propagate_without_error_hooks() {
        let svc = numbers();
        let err = svc.create(TenantContext::new("a"), 0, None).await.unwrap_err();
        assert_eq!(HostpressError::kind_of(&err), Some(ErrorKind::Conflict));
    }

    #[tokio::test]
    async fn error_hook_can_recover() {
        let svc = numbers().hooks(|h| {
            h.error_all(Arc::new(Recover));
        });
        let out = svc.create(TenantContext::new("a"), 0, None).await.unwrap();
        assert_eq!(out, 0);
    }

    #[tokio::test]
    async fn unimplemented_methods_report_not_implemented() {
        let err = numbers().get(TenantContext::new("a"), "1", None).await.unwrap_err();
        assert_eq!(HostpressError::kind_of(&err), Some(ErrorKind::NotImplemented));
    }

    #[tokio::test]
    async fn find_page_combines_count_and_window() {
        let svc = numbers();
        let page = svc
            .find_page(TenantContext::new("a"), Some(Pagination { page: 2, page_size: 5 }))
            .await
            .unwrap();
        assert_eq!(page.items, vec![6, 7]);
        assert_eq!(page.total, 7);
        assert_eq!(page.total_pages, 2);

        let err = svc.find_page(TenantContext::new("a"), None).await.unwrap_err();
        assert_eq!(HostpressError::kind_of(&err), Some(ErrorKind::General));
    }

    #[test]
    fn config_round_trips() {
        let app = HostpressApp::new();
        app.set("paginate.max", "100");
        assert_eq!(app.get("paginate.max").as_deref(), Some("100"));
        assert_eq!(app.config_snapshot().get_u64("paginate.max"), Some(100));
    }
}
