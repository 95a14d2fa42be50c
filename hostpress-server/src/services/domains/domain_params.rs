use hostpress_axum::params::FromRestParams;
use hostpress_core::{PaginateParams, Pagination};

use crate::services::HostpressParams;

/// Params for the domains admin service. Listings are not paged.
#[derive(Debug, Clone)]
pub struct DomainParams {
    pub rest: HostpressParams,
}

impl DomainParams {
    /// The `?domain=` key used by `DELETE /api/admin/domains`.
    pub fn domain(&self) -> Option<&str> {
        self.rest
            .query
            .get("domain")
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }
}

impl FromRestParams for DomainParams {
    fn from_rest_params(params: HostpressParams) -> Self {
        Self { rest: params }
    }
}

impl PaginateParams for DomainParams {
    fn pagination(&self) -> Option<Pagination> {
        None
    }
}
