// ABOUTME: Defines the Content record representing a saved link with metadata.
// ABOUTME: Includes creation input, partial-update patches, and tag normalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;
use uuid::Uuid;

/// A user-owned content item: a saved link with notes, tags, and an
/// optional shareable id that grants unauthenticated read access while
/// the item is public.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: Ulid,
    pub owner_id: Ulid,
    pub title: String,
    pub link: String,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub is_public: bool,
    /// Assigned the first time the item is made public and never
    /// regenerated or cleared afterwards.
    pub shareable_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Content {
    /// Create a new Content item for an owner. Tags are normalized,
    /// visibility defaults to private, and no shareable id is assigned.
    pub fn new(owner_id: Ulid, input: NewContent) -> Self {
        let now = Utc::now();
        Self {
            id: Ulid::new(),
            owner_id,
            title: input.title,
            link: input.link,
            notes: input.notes,
            tags: normalize_tags(input.tags),
            is_public: input.is_public.unwrap_or(false),
            shareable_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating a content item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContent {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
}

/// A partial update: only fields that are present are applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPatch {
    pub title: Option<String>,
    pub link: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
}

/// Normalize tags at write time: trim surrounding whitespace and lowercase.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_lowercase())
        .collect()
}
