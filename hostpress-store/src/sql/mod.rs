//! libSQL-backed store (local file database).
//!
//! Each operation opens its own connection to the shared [`Database`], so a
//! transaction never interleaves with another request's statements. The
//! cascade in [`BlogStore::delete_domain`] runs inside one transaction.

mod migrations;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hostpress_core::{bail_hp, HostKey, HostpressError};
use libsql::{params, Connection, Database, Row};
use uuid::Uuid;

use crate::models::{Domain, Post};
use crate::store::BlogStore;

const BUSY_TIMEOUT_MS: u32 = 5_000;

const POST_COLUMNS: &str = "id, title, content, slug, author, host_key, created_at, updated_at";
const DOMAIN_COLUMNS: &str = "id, host_key, title, description, created_at, updated_at";

pub struct SqlStore {
    db: Database,
    path: PathBuf,
    closed: AtomicBool,
}

fn is_unique_violation(err: &libsql::Error) -> bool {
    err.to_string().contains("UNIQUE constraint failed")
}

fn db_err(err: libsql::Error) -> anyhow::Error {
    let details = err.to_string();
    HostpressError::upstream("Database operation failed")
        .with_details(details)
        .with_source(err.into())
        .into_anyhow()
}

fn decode_err(what: &str, details: impl Into<String>) -> anyhow::Error {
    HostpressError::upstream(format!("Malformed {what} row"))
        .with_details(details)
        .into_anyhow()
}

fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| decode_err("timestamp", ms.to_string()))
}

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| decode_err("id", e.to_string()))
}

fn post_from_row(row: &Row) -> Result<Post> {
    Ok(Post {
        id: parse_id(&row.get::<String>(0).map_err(db_err)?)?,
        title: row.get::<String>(1).map_err(db_err)?,
        content: row.get::<String>(2).map_err(db_err)?,
        slug: row.get::<String>(3).map_err(db_err)?,
        author: row.get::<String>(4).map_err(db_err)?,
        host_key: HostKey::new(row.get::<String>(5).map_err(db_err)?),
        created_at: from_millis(row.get::<i64>(6).map_err(db_err)?)?,
        updated_at: from_millis(row.get::<i64>(7).map_err(db_err)?)?,
    })
}

fn domain_from_row(row: &Row) -> Result<Domain> {
    Ok(Domain {
        id: parse_id(&row.get::<String>(0).map_err(db_err)?)?,
        host_key: HostKey::new(row.get::<String>(1).map_err(db_err)?),
        title: row.get::<String>(2).map_err(db_err)?,
        description: row.get::<String>(3).map_err(db_err)?,
        created_at: from_millis(row.get::<i64>(4).map_err(db_err)?)?,
        updated_at: from_millis(row.get::<i64>(5).map_err(db_err)?)?,
    })
}

async fn query_domain(conn: &Connection, host: &HostKey) -> Result<Option<Domain>> {
    let mut rows = conn
        .query(
            &format!("SELECT {DOMAIN_COLUMNS} FROM domains WHERE host_key = ?1"),
            params![host.as_str()],
        )
        .await
        .map_err(db_err)?;

    match rows.next().await.map_err(db_err)? {
        Some(row) => Ok(Some(domain_from_row(&row)?)),
        None => Ok(None),
    }
}

impl SqlStore {
    /// Open or create the database at `path` and apply pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                HostpressError::unavailable("Cannot create database directory")
                    .with_details(format!("{}: {e}", parent.display()))
                    .into_anyhow()
            })?;
        }

        let db = libsql::Builder::new_local(&path)
            .build()
            .await
            .map_err(db_err)?;

        let store = Self {
            db,
            path,
            closed: AtomicBool::new(false),
        };
        store.run_migrations().await?;
        tracing::info!(path = %store.path.display(), "database ready");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn connect(&self) -> Result<Connection> {
        if self.closed.load(Ordering::Acquire) {
            bail_hp!(unavailable, "store is closed");
        }
        let conn = self.db.connect().map_err(db_err)?;
        // PRAGMA returns a row, so it goes through query()
        conn.query(&format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"), ())
            .await
            .map_err(db_err)?;
        Ok(conn)
    }

    async fn schema_version(conn: &Connection) -> u32 {
        match conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await
        {
            Ok(mut rows) => match rows.next().await {
                Ok(Some(row)) => row.get::<u32>(0).unwrap_or(0),
                _ => 0,
            },
            // table does not exist yet
            Err(_) => 0,
        }
    }

    async fn run_migrations(&self) -> Result<()> {
        let conn = self.connect().await?;
        let current = Self::schema_version(&conn).await;

        for migration in migrations::all_migrations() {
            if migration.version > current {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                conn.execute_batch(migration.sql).await.map_err(|e| {
                    HostpressError::unavailable(format!("migration v{} failed", migration.version))
                        .with_details(e.to_string())
                        .into_anyhow()
                })?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl BlogStore for SqlStore {
    async fn list_posts(&self, host: &HostKey, skip: u64, limit: Option<u64>) -> Result<Vec<Post>> {
        let conn = self.connect().await?;
        // LIMIT -1 is unbounded in SQLite
        let limit = limit.map_or(-1, |n| n.min(i64::MAX as u64) as i64);
        let offset = skip.min(i64::MAX as u64) as i64;

        let mut rows = conn
            .query(
                &format!(
                    "SELECT {POST_COLUMNS} FROM posts WHERE host_key = ?1
                     ORDER BY created_at DESC, rowid DESC LIMIT ?2 OFFSET ?3"
                ),
                params![host.as_str(), limit, offset],
            )
            .await
            .map_err(db_err)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            out.push(post_from_row(&row)?);
        }
        Ok(out)
    }

    async fn count_posts(&self, host: &HostKey) -> Result<u64> {
        let conn = self.connect().await?;
        let mut rows = conn
            .query(
                "SELECT COUNT(*) FROM posts WHERE host_key = ?1",
                params![host.as_str()],
            )
            .await
            .map_err(db_err)?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => Ok(row.get::<i64>(0).map_err(db_err)?.max(0) as u64),
            None => Ok(0),
        }
    }

    async fn find_post_by_slug(&self, host: &HostKey, slug: &str) -> Result<Option<Post>> {
        let conn = self.connect().await?;
        let mut rows = conn
            .query(
                &format!("SELECT {POST_COLUMNS} FROM posts WHERE slug = ?1 AND host_key = ?2"),
                params![slug, host.as_str()],
            )
            .await
            .map_err(db_err)?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => Ok(Some(post_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn insert_post(&self, post: Post) -> Result<Post> {
        let conn = self.connect().await?;
        let res = conn
            .execute(
                &format!("INSERT INTO posts ({POST_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
                params![
                    post.id.to_string(),
                    post.title.as_str(),
                    post.content.as_str(),
                    post.slug.as_str(),
                    post.author.as_str(),
                    post.host_key.as_str(),
                    to_millis(post.created_at),
                    to_millis(post.updated_at),
                ],
            )
            .await;

        match res {
            Ok(_) => Ok(post),
            Err(e) if is_unique_violation(&e) => {
                bail_hp!(conflict, "Post with slug '{}' already exists", post.slug)
            }
            Err(e) => Err(db_err(e)),
        }
    }

    async fn list_domains(&self) -> Result<Vec<Domain>> {
        let conn = self.connect().await?;
        let mut rows = conn
            .query(
                &format!("SELECT {DOMAIN_COLUMNS} FROM domains ORDER BY created_at, host_key"),
                params![],
            )
            .await
            .map_err(db_err)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            out.push(domain_from_row(&row)?);
        }
        Ok(out)
    }

    async fn find_domain(&self, host: &HostKey) -> Result<Option<Domain>> {
        let conn = self.connect().await?;
        query_domain(&conn, host).await
    }

    async fn insert_domain(&self, domain: Domain) -> Result<Domain> {
        let conn = self.connect().await?;
        let res = conn
            .execute(
                &format!("INSERT INTO domains ({DOMAIN_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
                params![
                    domain.id.to_string(),
                    domain.host_key.as_str(),
                    domain.title.as_str(),
                    domain.description.as_str(),
                    to_millis(domain.created_at),
                    to_millis(domain.updated_at),
                ],
            )
            .await;

        match res {
            Ok(_) => Ok(domain),
            Err(e) if is_unique_violation(&e) => {
                bail_hp!(conflict, "Domain '{}' already exists", domain.host_key)
            }
            Err(e) => Err(db_err(e)),
        }
    }

    async fn delete_domain(&self, host: &HostKey) -> Result<(Option<Domain>, u64)> {
        let conn = self.connect().await?;
        let tx = conn.transaction().await.map_err(db_err)?;

        let domain = query_domain(&tx, host).await?;
        let posts_removed = tx
            .execute("DELETE FROM posts WHERE host_key = ?1", params![host.as_str()])
            .await
            .map_err(db_err)?;
        tx.execute("DELETE FROM domains WHERE host_key = ?1", params![host.as_str()])
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok((domain, posts_removed))
    }

    async fn clear(&self) -> Result<()> {
        let conn = self.connect().await?;
        conn.execute_batch("DELETE FROM posts; DELETE FROM domains;")
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::info!(path = %self.path.display(), "database closed");
        }
        Ok(())
    }
}
