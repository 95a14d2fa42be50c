use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use hostpress_axum::axum;
use hostpress_axum::params::RestParams;
use hostpress_core::errors::HostpressError;
use hostpress_core::{
    HostpressApp, ServiceCapabilities, ServiceMethodKind, TenantContext, TenantService,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

struct ValidationOnCreate;

#[async_trait::async_trait]
impl TenantService<Value, Value, ()> for ValidationOnCreate {
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::from_methods(vec![ServiceMethodKind::Create])
    }

    async fn create(&self, _ctx: &TenantContext, _data: Value, _params: ()) -> anyhow::Result<Value> {
        Err(HostpressError::validation("Invalid")
            .with_data(json!({"title": ["required"]}))
            .into_anyhow())
    }
}

struct BoomOnCreate;

#[async_trait::async_trait]
impl TenantService<Value, Value, ()> for BoomOnCreate {
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::from_methods(vec![ServiceMethodKind::Create])
    }

    async fn create(&self, _ctx: &TenantContext, _data: Value, _params: ()) -> anyhow::Result<Value> {
        Err(anyhow::anyhow!("boom"))
    }
}

/// Echoes the tenant and the window it was asked for.
struct Echo;

#[async_trait::async_trait]
impl TenantService<Value, Value, RestParams> for Echo {
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::from_methods(vec![
            ServiceMethodKind::Find,
            ServiceMethodKind::Count,
            ServiceMethodKind::Get,
        ])
    }

    async fn find(&self, ctx: &TenantContext, params: RestParams) -> anyhow::Result<Vec<Value>> {
        Ok(vec![json!({
            "host": ctx.host.as_str(),
            "page": params.pagination.page,
            "pageSize": params.pagination.page_size,
        })])
    }

    async fn count(&self, _ctx: &TenantContext, _params: RestParams) -> anyhow::Result<u64> {
        Ok(41)
    }

    async fn get(&self, ctx: &TenantContext, id: &str, _params: RestParams) -> anyhow::Result<Value> {
        if id == "missing" {
            return Err(HostpressError::not_found(format!("No record '{id}'")).into_anyhow());
        }
        Ok(json!({"id": id, "host": ctx.host.as_str()}))
    }
}

fn unit<S>(svc: S) -> Arc<dyn TenantService<Value, Value, ()>>
where
    S: TenantService<Value, Value, ()> + 'static,
{
    Arc::new(svc)
}

async fn json_body(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("host", "example.com")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn malformed_json_returns_validation_error() {
    let app = HostpressApp::new();
    let posts = app.service("posts", unit(BoomOnCreate));
    let ax = axum(app).use_service("/posts", posts);

    let res = ax
        .router()
        .oneshot(post_json("/posts", "{\"title\":\"x\""))
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 400);
    assert!(res.headers().get("x-request-id").is_some());
    let body = json_body(res).await;
    assert_eq!(body["name"], "ValidationError");
    assert_eq!(body["code"], 400);
    assert!(body["data"].get("_schema").is_some());
}

#[tokio::test]
async fn request_id_is_preserved_when_provided() {
    let app = HostpressApp::new();
    let posts = app.service("posts", unit(BoomOnCreate));
    let ax = axum(app).use_service("/posts", posts);

    let provided = HeaderValue::from_static("req-test-123");
    let mut req = post_json("/posts", "{\"title\":\"ok\"}");
    req.headers_mut().insert("x-request-id", provided.clone());

    let res = ax.router().oneshot(req).await.unwrap();
    assert_eq!(res.headers().get("x-request-id").unwrap(), &provided);
}

#[tokio::test]
async fn validation_error_preserves_status_and_data() {
    let app = HostpressApp::new();
    let posts = app.service("posts", unit(ValidationOnCreate));
    let ax = axum(app).use_service("/posts", posts);

    let res = ax
        .router()
        .oneshot(post_json("/posts", "{\"title\":\"ok\"}"))
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 400);
    let body = json_body(res).await;
    assert_eq!(body["name"], "ValidationError");
    assert_eq!(body["error"], "Invalid");
    assert_eq!(body["data"], json!({"title": ["required"]}));
}

#[tokio::test]
async fn foreign_error_maps_to_general_error_shape() {
    let app = HostpressApp::new();
    let posts = app.service("posts", unit(BoomOnCreate));
    let ax = axum(app).use_service("/posts", posts);

    let res = ax
        .router()
        .oneshot(post_json("/posts", "{\"title\":\"ok\"}"))
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 500);
    let body = json_body(res).await;
    assert_eq!(body["name"], "GeneralError");
    assert_eq!(body["code"], 500);
    assert_eq!(body["error"], "Internal server error");
    assert!(body["details"].as_str().unwrap().contains("boom"));
}

#[tokio::test]
async fn only_allowed_methods_are_mounted() {
    let app = HostpressApp::new();
    let posts = app.service("posts", unit(BoomOnCreate));
    let ax = axum(app).use_service("/posts", posts);

    let res = ax
        .router()
        .oneshot(Request::builder().uri("/posts").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 405);

    let res = ax
        .router()
        .oneshot(Request::builder().uri("/posts/abc").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);
}

#[tokio::test]
async fn find_is_paginated_and_keyed_by_host() {
    let app = HostpressApp::new();
    app.set("paginate.max", "10");
    let echo = app.service("echo", Arc::new(Echo) as Arc<dyn TenantService<Value, Value, RestParams>>);
    let ax = axum(app).use_service("/echo", echo);

    let res = ax
        .router()
        .oneshot(
            Request::builder()
                .uri("/echo?page=2&pageSize=50")
                .header("host", "blog1.example.com:8080")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    let body = json_body(res).await;
    assert_eq!(body["total"], 41);
    assert_eq!(body["page"], 2);
    assert_eq!(body["pageSize"], 10);
    assert_eq!(body["totalPages"], 5);
    assert_eq!(body["items"][0]["host"], "blog1.example.com:8080");
    assert_eq!(body["items"][0]["pageSize"], 10);
}

#[tokio::test]
async fn get_maps_not_found() {
    let app = HostpressApp::new();
    let echo = app.service("echo", Arc::new(Echo) as Arc<dyn TenantService<Value, Value, RestParams>>);
    let ax = axum(app).use_service("/echo", echo);

    let res = ax
        .router()
        .oneshot(
            Request::builder()
                .uri("/echo/missing")
                .header("host", "a.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);
    let body = json_body(res).await;
    assert_eq!(body["name"], "NotFoundError");

    let res = ax
        .router()
        .oneshot(
            Request::builder()
                .uri("/echo/abc")
                .header("host", "a.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(res).await;
    assert_eq!(body, json!({"id": "abc", "host": "a.example.com"}));
}
