//! hostpress-core: framework-agnostic core for hostpress.
//!
//! Tenant keys, the service + hook pipeline, pagination, errors and the
//! deterministic per-host theme.

pub mod app;
pub mod config;
pub mod errors;
pub mod hooks;
pub mod paginate;
pub mod service;
pub mod tenant;
pub mod theme;

pub use app::{HostpressApp, ServiceHandle};
pub use config::{ConfigSnapshot, HostpressConfig};
pub use errors::{ErrorKind, HostpressError, HostpressResult};
pub use hooks::{AfterHook, BeforeHook, ErrorHook, HookContext, HookResult, ServiceHooks};
pub use paginate::{PaginateParams, Paginated, Pagination};
pub use service::{ServiceCapabilities, ServiceMethodKind, TenantService};
pub use tenant::{HostKey, TenantContext};
pub use theme::{derive_theme, HslColor, ThemeDescriptor};
