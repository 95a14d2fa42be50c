//! Demo data: `blog{i}.localhost:3000` tenants with two posts each.

use anyhow::Result;
use chrono::Utc;
use hostpress_store::{BlogStore, NewDomain, NewPost};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub domains: usize,
    pub posts: usize,
}

pub fn seed_host(i: usize) -> String {
    format!("blog{i}.localhost:3000")
}

fn sample_posts(host: &str) -> [NewPost; 2] {
    [
        NewPost {
            title: format!("Getting Started with Rust - {host}"),
            content: "<p>Rust gives you memory safety without a garbage collector. This guide walks through installing the toolchain, creating a project and shipping a first binary.</p>".into(),
            slug: format!("getting-started-with-rust-{host}"),
            author: "John Doe".into(),
            host_key: host.to_string(),
        },
        NewPost {
            title: format!("Understanding Async - {host}"),
            content: "<p>Async Rust lets one thread juggle thousands of connections. We look at futures, executors and how tokio drives them.</p>".into(),
            slug: format!("understanding-async-{host}"),
            author: "Jane Smith".into(),
            host_key: host.to_string(),
        },
    ]
}

/// Wipe the store, then create `count` demo tenants.
pub async fn seed(store: &dyn BlogStore, count: usize) -> Result<SeedSummary> {
    store.clear().await?;
    tracing::info!("cleared existing data");

    let mut summary = SeedSummary {
        domains: 0,
        posts: 0,
    };

    for i in 1..=count {
        let host = seed_host(i);
        let domain = NewDomain {
            host_key: host.clone(),
            title: format!("Blog {i}"),
            description: format!("Description for Blog {i}"),
        };
        domain.validated()?;
        store.insert_domain(domain.into_domain(Utc::now())).await?;
        summary.domains += 1;

        for post in sample_posts(&host) {
            store.insert_post(post.into_post(Utc::now())).await?;
            summary.posts += 1;
        }
        tracing::debug!(%host, "seeded tenant");
    }

    tracing::info!(domains = summary.domains, posts = summary.posts, "seeding complete");
    Ok(summary)
}
