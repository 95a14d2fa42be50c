use hostpress_axum::params::FromRestParams;
use hostpress_core::{PaginateParams, Pagination};

use crate::services::HostpressParams;

/// Params for the posts service. Listings always page.
#[derive(Debug, Clone)]
pub struct PostParams {
    pub rest: HostpressParams,
}

impl FromRestParams for PostParams {
    fn from_rest_params(params: HostpressParams) -> Self {
        Self { rest: params }
    }
}

impl PaginateParams for PostParams {
    fn pagination(&self) -> Option<Pagination> {
        Some(self.rest.pagination)
    }
}

impl AsRef<HostpressParams> for PostParams {
    fn as_ref(&self) -> &HostpressParams {
        &self.rest
    }
}
