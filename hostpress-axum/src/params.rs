use std::collections::HashMap;

use axum::http::{header, HeaderMap, Uri};
use hostpress_core::{ConfigSnapshot, PaginateParams, Pagination, TenantContext};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Per-request transport params handed to services and hooks.
#[derive(Debug, Clone, Default)]
pub struct RestParams {
    pub provider: String,
    pub headers: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub method: String,
    pub path: String,
    /// Raw `Host` header (port included), empty when absent.
    pub host: String,
    /// Window from `?page=&pageSize=` (`limit` is an alias), defaults applied.
    pub pagination: Pagination,
}

/// The request host: the `Host` header, else the URI authority, else "".
pub fn request_host(headers: &HeaderMap, uri: &Uri) -> String {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .or_else(|| uri.authority().map(|a| a.as_str().to_string()))
        .unwrap_or_default()
}

impl RestParams {
    pub fn from_parts(
        provider: &str,
        headers: &HeaderMap,
        query: HashMap<String, String>,
        method: &str,
        uri: &Uri,
        config: &ConfigSnapshot,
    ) -> Self {
        let pagination = Pagination::from_raw(
            query.get("page").map(|s| s.as_str()),
            query
                .get("pageSize")
                .or_else(|| query.get("limit"))
                .map(|s| s.as_str()),
            config.get_u64("paginate.default").unwrap_or(DEFAULT_PAGE_SIZE),
            config.get_u64("paginate.max").unwrap_or(MAX_PAGE_SIZE),
        );

        let mut out = Self {
            provider: provider.to_string(),
            headers: HashMap::new(),
            query,
            method: method.to_string(),
            path: uri.path().to_string(),
            host: request_host(headers, uri),
            pagination,
        };

        for (k, v) in headers.iter() {
            if let Ok(s) = v.to_str() {
                out.headers.insert(k.to_string(), s.to_string());
            }
        }

        out
    }

    /// Tenant for this request, keyed by the raw host.
    pub fn tenant(&self) -> TenantContext {
        TenantContext::new(self.host.clone())
    }
}

/// Raw params always page.
impl PaginateParams for RestParams {
    fn pagination(&self) -> Option<Pagination> {
        Some(self.pagination)
    }
}

pub trait FromRestParams: Sized {
    fn from_rest_params(params: RestParams) -> Self;
}

impl FromRestParams for RestParams {
    fn from_rest_params(params: RestParams) -> Self {
        params
    }
}

impl FromRestParams for () {
    fn from_rest_params(_params: RestParams) -> Self {}
}
