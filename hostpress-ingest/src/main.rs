use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hostpress_core::bail_hp;
use hostpress_ingest::{seed, IngestConfig, OpenAiClient, Pipeline, Scraper};
use tracing_subscriber::EnvFilter;

/// Generate or seed hostpress content.
#[derive(Parser)]
#[command(name = "hostpress-ingest", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fill the configured tenants with generated posts.
    Run {
        /// TOML run configuration.
        #[arg(short, long)]
        config: PathBuf,

        /// Store to write to (`memory` for a dry run).
        #[arg(long, env = "HOSTPRESS_DATABASE", default_value = "hostpress.db")]
        database: String,

        /// Overrides the model named in the config file.
        #[arg(long, env = "OPENAI_MODEL")]
        model: Option<String>,
    },

    /// Replace the store's contents with demo tenants.
    Seed {
        #[arg(long, env = "HOSTPRESS_DATABASE", default_value = "hostpress.db")]
        database: String,

        /// Number of demo tenants.
        #[arg(long, default_value_t = 20)]
        count: usize,
    },
}

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

    match Cli::parse().command {
        Command::Run {
            config,
            database,
            model,
        } => run(config, database, model).await,
        Command::Seed { database, count } => {
            let store = hostpress_store::open(&database).await?;
            let outcome = seed(store.as_ref(), count).await;
            store.close().await?;
            outcome.map(|_| ())
        }
    }
}

async fn run(config_path: PathBuf, database: String, model: Option<String>) -> Result<()> {
    let mut config = IngestConfig::load(&config_path).await?;
    if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
        config.model = model;
    }

    let api_key = match std::env::var(&config.api_key_env) {
        Ok(key) if !key.trim().is_empty() => key,
        _ => bail_hp!(validation, "Missing API key: set {}", config.api_key_env),
    };

    let llm = Arc::new(OpenAiClient::new(&config.api_base, api_key, &config.model)?);
    let scraper = Scraper::new(&config.cache_dir, config.cache_ttl())?;
    let store = hostpress_store::open(&database).await?;

    tracing::info!(
        tenants = config.domains.len(),
        posts_per_tenant = config.total_posts,
        model = %config.model,
        "starting ingestion"
    );

    let pipeline = Pipeline::new(Arc::new(config), Arc::clone(&store), llm, scraper);
    let report = pipeline.run().await;

    for tenant in report.failed() {
        tracing::warn!(
            host = %tenant.host,
            created = tenant.posts_created,
            error = tenant.error.as_deref().unwrap_or_default(),
            "tenant incomplete"
        );
    }

    store.close().await?;
    Ok(())
}
