//! Typed records. Wire format is camelCase JSON.

use chrono::{DateTime, Utc};
use hostpress_core::{HostKey, HostpressError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A blog post, partitioned by `host_key`. `slug` is unique store-wide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    /// HTML body.
    pub content: String,
    pub slug: String,
    pub author: String,
    pub host_key: HostKey,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The tenant record for one host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub id: Uuid,
    pub host_key: HostKey,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a post. Missing fields deserialize as empty and are
/// rejected by [`Validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct NewPost {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    #[validate(length(min = 1, message = "slug is required"))]
    pub slug: String,
    #[validate(length(min = 1, message = "author is required"))]
    pub author: String,
    #[serde(alias = "domain")]
    #[validate(length(min = 1, message = "hostKey is required"))]
    pub host_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct NewDomain {
    #[serde(alias = "domain")]
    #[validate(length(min = 1, message = "hostKey is required"))]
    pub host_key: String,
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
}

fn check<T: Validate>(input: &T, what: &str) -> anyhow::Result<()> {
    input.validate().map_err(|errors| {
        let data = serde_json::to_value(&errors).unwrap_or_default();
        HostpressError::validation(format!("{what} validation failed"))
            .with_details(errors.to_string())
            .with_data(data)
            .into_anyhow()
    })
}

impl NewPost {
    pub fn validated(&self) -> anyhow::Result<()> {
        check(self, "Post")
    }

    /// Stamp a record from this input.
    pub fn into_post(self, now: DateTime<Utc>) -> Post {
        Post {
            id: Uuid::new_v4(),
            title: self.title,
            content: self.content,
            slug: self.slug,
            author: self.author,
            host_key: HostKey::new(self.host_key),
            created_at: now,
            updated_at: now,
        }
    }
}

impl NewDomain {
    pub fn validated(&self) -> anyhow::Result<()> {
        check(self, "Domain")
    }

    pub fn into_domain(self, now: DateTime<Utc>) -> Domain {
        Domain {
            id: Uuid::new_v4(),
            host_key: HostKey::new(self.host_key),
            title: self.title,
            description: self.description,
            created_at: now,
            updated_at: now,
        }
    }
}
