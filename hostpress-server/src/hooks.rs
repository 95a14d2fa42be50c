use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use hostpress_core::errors::{ErrorKind, HostpressError};
use hostpress_core::hooks::{AfterHook, ErrorHook, HookContext, HookResult, ServiceHooks};

/// Records every service call: service, method, host and outcome.
pub struct LogCall;

fn records<R>(result: &Option<HookResult<R>>) -> u64 {
    match result {
        Some(HookResult::Many(v)) => v.len() as u64,
        Some(HookResult::One(_)) => 1,
        Some(HookResult::Count(n)) => *n,
        None => 0,
    }
}

#[async_trait]
impl<R, D, P> AfterHook<R, D, P> for LogCall
where
    R: Send + 'static,
    D: Send + 'static,
    P: Send + 'static,
{
    async fn run(&self, ctx: &mut HookContext<R, D, P>) -> Result<()> {
        tracing::info!(
            service = %ctx.service,
            method = ctx.method.as_str(),
            host = %ctx.tenant.host,
            records = records(&ctx.result),
            "ok"
        );
        Ok(())
    }
}

#[async_trait]
impl<R, D, P> ErrorHook<R, D, P> for LogCall
where
    R: Send + 'static,
    D: Send + 'static,
    P: Send + 'static,
{
    async fn run(&self, ctx: &mut HookContext<R, D, P>) -> Result<()> {
        let Some(err) = ctx.error.as_ref() else {
            return Ok(());
        };

        let kind = HostpressError::kind_of(err).unwrap_or(ErrorKind::General);
        if kind.status_code() >= 500 {
            tracing::error!(
                service = %ctx.service,
                method = ctx.method.as_str(),
                host = %ctx.tenant.host,
                error = %err,
                "failed"
            );
        } else {
            tracing::warn!(
                service = %ctx.service,
                method = ctx.method.as_str(),
                host = %ctx.tenant.host,
                kind = kind.name(),
                error = %err,
                "rejected"
            );
        }
        Ok(())
    }
}

pub fn log_calls<R, D, P>(h: &mut ServiceHooks<R, D, P>)
where
    R: Send + 'static,
    D: Send + 'static,
    P: Send + 'static,
{
    h.after_all(Arc::new(LogCall));
    h.error_all(Arc::new(LogCall));
}
