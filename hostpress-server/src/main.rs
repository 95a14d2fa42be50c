use anyhow::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let app = hostpress_server::app::hostpress_app(std::env::vars());

    let database = app
        .get("database.url")
        .unwrap_or_else(|| "hostpress.db".to_string());
    let store = hostpress_store::open(&database).await?;

    let host = app
        .get("http.host")
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let port = app.get("http.port").unwrap_or_else(|| "3000".to_string());
    let addr = format!("{host}:{port}");

    let ax = hostpress_server::build(app, std::sync::Arc::clone(&store));
    let served = ax.listen(addr).await;

    store.close().await?;
    served
}
