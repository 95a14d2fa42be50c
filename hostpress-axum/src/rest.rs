use std::collections::HashMap;

use axum::{
    extract::rejection::JsonRejection,
    extract::{OriginalUri, Path, Query, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::MethodRouter,
    Json, Router,
};
use hostpress_core::errors::HostpressError;
use hostpress_core::{PaginateParams, ServiceHandle, ServiceMethodKind, TenantContext};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::{
    params::{FromRestParams, RestParams},
    HostpressAxumError, HostpressAxumState,
};

type QueryMap = Query<HashMap<String, String>>;

fn map_json_rejection(rejection: JsonRejection) -> HostpressAxumError {
    HostpressError::validation("Failed to parse the request body as JSON")
        .with_details(rejection.body_text())
        .with_data(json!({"_schema": [rejection.to_string()]}))
        .into()
}

fn request<R, D, P>(
    state: &HostpressAxumState<R, D, P>,
    headers: &HeaderMap,
    query: HashMap<String, String>,
    method: &str,
    uri: &Uri,
) -> (TenantContext, P)
where
    R: Send + 'static,
    D: Send + 'static,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let config = state.service.app().config_snapshot();
    let params = RestParams::from_parts("rest", headers, query, method, uri, &config);
    (params.tenant(), P::from_rest_params(params))
}

/// Mount a service under `/` and `/{id}`, exposing only the methods its
/// capabilities allow:
///
/// - `GET /`: find; a paginated envelope when params carry a window
/// - `POST /`: create, `201 Created`
/// - `DELETE /`: remove without an id (key taken from params)
/// - `GET /{id}`: get
/// - `DELETE /{id}`: remove
pub fn service_router<R, D, P>(service: ServiceHandle<R, D, P>) -> Router<()>
where
    R: Serialize + Send + Sync + 'static,
    D: DeserializeOwned + Send + 'static,
    P: FromRestParams + PaginateParams + Send + Sync + Clone + 'static,
{
    let caps = service.inner().capabilities();
    let state = HostpressAxumState::new(service);

    let mut root: MethodRouter<HostpressAxumState<R, D, P>> = MethodRouter::new();
    let mut item: MethodRouter<HostpressAxumState<R, D, P>> = MethodRouter::new();
    let (mut has_root, mut has_item) = (false, false);

    if caps.allows(ServiceMethodKind::Find) {
        has_root = true;
        root = root.get(
            |State(state): State<HostpressAxumState<R, D, P>>,
             headers: HeaderMap,
             Query(query): QueryMap,
             OriginalUri(uri): OriginalUri| async move {
                let (tenant, params) = request(&state, &headers, query, "GET", &uri);

                let res: Response = if params.pagination().is_some() {
                    Json(state.service.find_page(tenant, params).await?).into_response()
                } else {
                    Json(state.service.find(tenant, params).await?).into_response()
                };
                Ok::<_, HostpressAxumError>(res)
            },
        );
    }

    if caps.allows(ServiceMethodKind::Create) {
        has_root = true;
        root = root.post(
            |State(state): State<HostpressAxumState<R, D, P>>,
             headers: HeaderMap,
             Query(query): QueryMap,
             OriginalUri(uri): OriginalUri,
             data: Result<Json<D>, JsonRejection>| async move {
                let Json(data) = data.map_err(map_json_rejection)?;
                let (tenant, params) = request(&state, &headers, query, "POST", &uri);

                let created = state.service.create(tenant, data, params).await?;
                Ok::<_, HostpressAxumError>((StatusCode::CREATED, Json(created)))
            },
        );
    }

    if caps.allows(ServiceMethodKind::Remove) {
        has_root = true;
        has_item = true;
        root = root.delete(
            |State(state): State<HostpressAxumState<R, D, P>>,
             headers: HeaderMap,
             Query(query): QueryMap,
             OriginalUri(uri): OriginalUri| async move {
                let (tenant, params) = request(&state, &headers, query, "DELETE", &uri);

                let removed = state.service.remove(tenant, None, params).await?;
                Ok::<_, HostpressAxumError>(Json(removed))
            },
        );
        item = item.delete(
            |State(state): State<HostpressAxumState<R, D, P>>,
             headers: HeaderMap,
             Query(query): QueryMap,
             OriginalUri(uri): OriginalUri,
             Path(id): Path<String>| async move {
                let (tenant, params) = request(&state, &headers, query, "DELETE", &uri);

                let removed = state.service.remove(tenant, Some(&id), params).await?;
                Ok::<_, HostpressAxumError>(Json(removed))
            },
        );
    }

    if caps.allows(ServiceMethodKind::Get) {
        has_item = true;
        item = item.get(
            |State(state): State<HostpressAxumState<R, D, P>>,
             headers: HeaderMap,
             Query(query): QueryMap,
             OriginalUri(uri): OriginalUri,
             Path(id): Path<String>| async move {
                let (tenant, params) = request(&state, &headers, query, "GET", &uri);

                let record = state.service.get(tenant, &id, params).await?;
                Ok::<_, HostpressAxumError>(Json(record))
            },
        );
    }

    let mut router: Router<HostpressAxumState<R, D, P>> = Router::new();
    if has_root {
        router = router.route("/", root);
    }
    if has_item {
        router = router.route("/{id}", item);
    }
    router.with_state(state)
}
