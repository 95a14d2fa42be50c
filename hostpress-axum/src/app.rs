use axum::body::Body;
use axum::handler::Handler;
use axum::http::Request;
use axum::routing::get;
use axum::Router;
use hostpress_core::{HostpressApp, PaginateParams, ServiceHandle};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::params::FromRestParams;
use crate::rest;

/// An axum router being assembled around a [`HostpressApp`].
#[derive(Clone)]
pub struct AxumApp {
    pub app: HostpressApp,
    pub routes: Router<()>,
}

fn mount(router: Router<()>, path: &str, inner: Router<()>) -> Router<()> {
    if path.is_empty() || path == "/" {
        router.merge(inner)
    } else {
        router.nest(path, inner)
    }
}

impl AxumApp {
    pub fn new(app: HostpressApp) -> Self {
        Self {
            app,
            routes: Router::new(),
        }
    }

    pub fn use_router(mut self, path: &str, router: Router<()>) -> Self {
        self.routes = mount(self.routes, path, router);
        self
    }

    pub fn use_get<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()> + Clone + Send + Sync + 'static,
        T: 'static,
    {
        let router = Router::new().route(path, get(handler));
        self.use_router("/", router)
    }

    /// A plain GET route, e.g. `/health`.
    pub fn service<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()> + Clone + Send + Sync + 'static,
        T: 'static,
    {
        self.use_get(path, handler)
    }

    /// Mount a service's REST routes under `path`.
    pub fn use_service<R, D, P>(mut self, path: &str, service: ServiceHandle<R, D, P>) -> Self
    where
        R: Serialize + Send + Sync + 'static,
        D: DeserializeOwned + Send + 'static,
        P: FromRestParams + PaginateParams + Send + Sync + Clone + 'static,
    {
        tracing::debug!(path, service = service.name(), "mounting service");
        self.routes = mount(self.routes, path, rest::service_router(service));
        self
    }

    /// The finished router: request-id, tracing and id propagation layers applied.
    pub fn router(&self) -> Router<()> {
        let layers = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                let header = |name: &str| {
                    req.headers()
                        .get(name)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string()
                };
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    uri = %req.uri(),
                    host = %header("host"),
                    request_id = %header("x-request-id"),
                )
            }))
            .layer(PropagateRequestIdLayer::x_request_id());

        self.routes.clone().layer(layers)
    }

    /// Serve until Ctrl-C, then drain in-flight requests and return.
    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

pub fn axum(app: HostpressApp) -> AxumApp {
    AxumApp::new(app)
}
