//! hostpress-ingest: fills tenants with generated posts.
//!
//! A run walks the configured tenants, scrapes a few reference sites per
//! post, asks a language model for an outline, expands every outline
//! section, and stores the assembled HTML as a post for that tenant.

pub mod config;
pub mod llm;
pub mod outline;
pub mod pipeline;
pub mod scraper;
pub mod seed;

pub use config::{CountRange, IngestConfig};
pub use llm::{CompletionClient, OpenAiClient};
pub use pipeline::{IngestReport, Pipeline, TenantReport};
pub use scraper::Scraper;
pub use seed::{seed, SeedSummary};
