use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use hostpress_core::{ErrorKind, HostKey, HostpressError};
use hostpress_store::{BlogStore, MemoryStore, NewDomain, NewPost, Post, SqlStore};

fn post(host: &str, slug: &str, minute: i64) -> Post {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    NewPost {
        title: format!("Title {slug}"),
        content: "<p>body</p>".into(),
        slug: slug.into(),
        author: "Admin".into(),
        host_key: host.into(),
    }
    .into_post(base + Duration::minutes(minute))
}

fn domain(host: &str, title: &str) -> NewDomain {
    NewDomain {
        host_key: host.into(),
        title: title.into(),
        description: "desc".into(),
    }
}

async fn sql_store() -> SqlStore {
    let tmp = std::env::temp_dir().join(format!("hostpress_test_{}.db", uuid::Uuid::new_v4()));
    SqlStore::open(&tmp).await.expect("open sql store")
}

async fn stores() -> Vec<(&'static str, Arc<dyn BlogStore>)> {
    vec![
        ("memory", Arc::new(MemoryStore::new()) as Arc<dyn BlogStore>),
        ("sql", Arc::new(sql_store().await) as Arc<dyn BlogStore>),
    ]
}

fn kind(err: &anyhow::Error) -> Option<ErrorKind> {
    HostpressError::kind_of(err)
}

#[tokio::test]
async fn posts_are_partitioned_and_newest_first() {
    for (name, store) in stores().await {
        let a = HostKey::from("a.example.com");
        for i in 0..7 {
            store.insert_post(post(a.as_str(), &format!("a-{i}"), i)).await.unwrap();
        }
        store.insert_post(post("b.example.com", "b-0", 100)).await.unwrap();

        assert_eq!(store.count_posts(&a).await.unwrap(), 7, "{name}");

        let page2 = store.list_posts(&a, 5, Some(5)).await.unwrap();
        let slugs: Vec<&str> = page2.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a-1", "a-0"], "{name}");

        let all = store.list_posts(&a, 0, None).await.unwrap();
        assert_eq!(all.len(), 7, "{name}");
        assert_eq!(all[0].slug, "a-6", "{name}");
        assert!(all.iter().all(|p| p.host_key == a), "{name}");

        let empty = HostKey::from("blog1.example.com");
        assert!(store.list_posts(&empty, 0, Some(20)).await.unwrap().is_empty());
        assert_eq!(store.count_posts(&empty).await.unwrap(), 0);
    }
}

#[tokio::test]
async fn slug_lookup_does_not_cross_tenants() {
    for (name, store) in stores().await {
        store.insert_post(post("b.example.com", "shared", 0)).await.unwrap();

        let other = store
            .find_post_by_slug(&HostKey::from("a.example.com"), "shared")
            .await
            .unwrap();
        let missing = store
            .find_post_by_slug(&HostKey::from("a.example.com"), "nope")
            .await
            .unwrap();
        assert_eq!(other, missing, "{name}");
        assert!(other.is_none(), "{name}");

        let own = store
            .find_post_by_slug(&HostKey::from("b.example.com"), "shared")
            .await
            .unwrap();
        assert_eq!(own.map(|p| p.slug), Some("shared".to_string()), "{name}");
    }
}

#[tokio::test]
async fn slugs_are_unique_across_tenants() {
    for (name, store) in stores().await {
        store.insert_post(post("a.example.com", "dup", 0)).await.unwrap();
        let err = store.insert_post(post("b.example.com", "dup", 1)).await.unwrap_err();
        assert_eq!(kind(&err), Some(ErrorKind::Conflict), "{name}");
        assert_eq!(store.count_posts(&HostKey::from("b.example.com")).await.unwrap(), 0);
    }
}

#[tokio::test]
async fn duplicate_domain_is_conflict_and_keeps_original() {
    for (name, store) in stores().await {
        let host = HostKey::from("blog1.localhost:3000");
        store
            .insert_domain(domain(host.as_str(), "Original").into_domain(Utc::now()))
            .await
            .unwrap();

        let err = store
            .insert_domain(domain(host.as_str(), "Replacement").into_domain(Utc::now()))
            .await
            .unwrap_err();
        assert_eq!(kind(&err), Some(ErrorKind::Conflict), "{name}");

        let kept = store.find_domain(&host).await.unwrap().unwrap();
        assert_eq!(kept.title, "Original", "{name}");
        assert_eq!(store.list_domains().await.unwrap().len(), 1, "{name}");
    }
}

#[tokio::test]
async fn delete_domain_cascades_to_posts() {
    for (name, store) in stores().await {
        let host = HostKey::from("blog2.localhost:3000");
        store
            .insert_domain(domain(host.as_str(), "Blog 2").into_domain(Utc::now()))
            .await
            .unwrap();
        for i in 0..3 {
            store.insert_post(post(host.as_str(), &format!("p{i}"), i)).await.unwrap();
        }
        store.insert_post(post("other.localhost:3000", "keep", 0)).await.unwrap();

        let (removed, posts) = store.delete_domain(&host).await.unwrap();
        assert_eq!(removed.map(|d| d.title), Some("Blog 2".to_string()), "{name}");
        assert_eq!(posts, 3, "{name}");
        assert_eq!(store.count_posts(&host).await.unwrap(), 0, "{name}");
        assert!(store.find_domain(&host).await.unwrap().is_none(), "{name}");
        assert_eq!(
            store.count_posts(&HostKey::from("other.localhost:3000")).await.unwrap(),
            1,
            "{name}"
        );

        // freed slugs can be reused
        store.insert_post(post("other.localhost:3000", "p0", 9)).await.unwrap();
    }
}

#[tokio::test]
async fn closed_store_is_unavailable() {
    for (name, store) in stores().await {
        store.close().await.unwrap();
        let err = store.list_domains().await.unwrap_err();
        assert_eq!(kind(&err), Some(ErrorKind::Unavailable), "{name}");
    }
}

#[tokio::test]
async fn sql_store_persists_across_reopen() {
    let tmp = std::env::temp_dir().join(format!("hostpress_test_{}.db", uuid::Uuid::new_v4()));
    {
        let store = SqlStore::open(&tmp).await.unwrap();
        store.insert_post(post("a.example.com", "kept", 0)).await.unwrap();
        store.close().await.unwrap();
    }
    let store = SqlStore::open(&tmp).await.unwrap();
    let found = store
        .find_post_by_slug(&HostKey::from("a.example.com"), "kept")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.created_at, post("a.example.com", "kept", 0).created_at);
}

#[tokio::test]
async fn open_selects_backend() {
    let store = hostpress_store::open("memory").await.unwrap();
    store.clear().await.unwrap();
    assert!(store.list_domains().await.unwrap().is_empty());
}
