// ABOUTME: SQLite-backed store for user and content records.
// ABOUTME: Encodes authorization as conditional mutations scoped to the owner id.

use std::path::Path;

use chrono::{DateTime, Utc};
use linkstash_core::{Content, ContentPatch, NewContent, User, normalize_tags};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;
use ulid::Ulid;
use uuid::Uuid;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user name already taken: {0}")]
    DuplicateUserName(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// The linkstash persistence layer. Content lookups and mutations that
/// act on behalf of a user always carry `content_id AND owner_id` in the
/// same statement, so authorization and lookup happen atomically and a
/// foreign owner is indistinguishable from a missing id.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create the database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                user_id TEXT PRIMARY KEY,
                user_name TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS content (
                content_id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                title TEXT NOT NULL,
                link TEXT NOT NULL,
                notes TEXT,
                tags TEXT NOT NULL,
                is_public INTEGER NOT NULL DEFAULT 0,
                shareable_id TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (owner_id) REFERENCES users(user_id)
            );

            CREATE INDEX IF NOT EXISTS idx_content_owner ON content(owner_id);
            CREATE INDEX IF NOT EXISTS idx_content_shareable ON content(shareable_id);",
        )?;

        Ok(Self { conn })
    }

    /// Insert a new user. The unique constraint on user_name surfaces
    /// as `DuplicateUserName`.
    pub fn create_user(&self, user_name: &str, password_hash: &str) -> Result<User, StoreError> {
        let user = User::new(user_name.to_string(), password_hash.to_string());
        let result = self.conn.execute(
            "INSERT INTO users (user_id, user_name, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                user.id.to_string(),
                user.user_name,
                user.password_hash,
                user.created_at.to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => Ok(user),
            Err(e) if is_unique_violation(&e) => {
                Err(StoreError::DuplicateUserName(user_name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Look up a user by username. Used by signin.
    pub fn find_user_by_name(&self, user_name: &str) -> Result<Option<User>, StoreError> {
        let user = self
            .conn
            .query_row(
                "SELECT user_id, user_name, password_hash, created_at
                 FROM users WHERE user_name = ?1",
                params![user_name],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Look up a user by stable id. Used to resolve token subjects.
    pub fn find_user_by_id(&self, id: Ulid) -> Result<Option<User>, StoreError> {
        let user = self
            .conn
            .query_row(
                "SELECT user_id, user_name, password_hash, created_at
                 FROM users WHERE user_id = ?1",
                params![id.to_string()],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Insert a new content item for an owner. Tags are normalized at
    /// write time; visibility defaults to private with no shareable id.
    pub fn create_content(
        &self,
        owner_id: Ulid,
        input: NewContent,
    ) -> Result<Content, StoreError> {
        let content = Content::new(owner_id, input);
        self.conn.execute(
            "INSERT INTO content
                (content_id, owner_id, title, link, notes, tags, is_public,
                 shareable_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                content.id.to_string(),
                content.owner_id.to_string(),
                content.title,
                content.link,
                content.notes,
                serde_json::to_string(&content.tags).unwrap_or_else(|_| "[]".to_string()),
                content.is_public,
                content.shareable_id.map(|u| u.to_string()),
                content.created_at.to_rfc3339(),
                content.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(content)
    }

    /// List all content owned by a user, newest first. Empty is not an
    /// error.
    pub fn list_content(&self, owner_id: Ulid) -> Result<Vec<Content>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT content_id, owner_id, title, link, notes, tags, is_public,
                    shareable_id, created_at, updated_at
             FROM content WHERE owner_id = ?1 ORDER BY created_at DESC",
        )?;

        let rows = stmt.query_map(params![owner_id.to_string()], row_to_content)?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    /// Apply a partial update to a content item, scoped to the owner.
    /// Only fields present in the patch are written; tags are
    /// re-normalized. Returns `None` when the id does not exist or is
    /// owned by someone else.
    pub fn update_content(
        &mut self,
        content_id: Ulid,
        owner_id: Ulid,
        patch: ContentPatch,
    ) -> Result<Option<Content>, StoreError> {
        let tx = self.conn.transaction()?;
        let id = content_id.to_string();
        let owner = owner_id.to_string();
        let now = Utc::now().to_rfc3339();

        if let Some(title) = &patch.title {
            tx.execute(
                "UPDATE content SET title = ?1 WHERE content_id = ?2 AND owner_id = ?3",
                params![title, id, owner],
            )?;
        }
        if let Some(link) = &patch.link {
            tx.execute(
                "UPDATE content SET link = ?1 WHERE content_id = ?2 AND owner_id = ?3",
                params![link, id, owner],
            )?;
        }
        if let Some(notes) = &patch.notes {
            tx.execute(
                "UPDATE content SET notes = ?1 WHERE content_id = ?2 AND owner_id = ?3",
                params![notes, id, owner],
            )?;
        }
        if let Some(tags) = patch.tags {
            let tags = normalize_tags(tags);
            tx.execute(
                "UPDATE content SET tags = ?1 WHERE content_id = ?2 AND owner_id = ?3",
                params![
                    serde_json::to_string(&tags).unwrap_or_else(|_| "[]".to_string()),
                    id,
                    owner
                ],
            )?;
        }
        if let Some(is_public) = patch.is_public {
            tx.execute(
                "UPDATE content SET is_public = ?1 WHERE content_id = ?2 AND owner_id = ?3",
                params![is_public, id, owner],
            )?;
        }

        // The timestamp bump doubles as the existence check: zero rows
        // means not-found-or-unauthorized.
        let affected = tx.execute(
            "UPDATE content SET updated_at = ?1 WHERE content_id = ?2 AND owner_id = ?3",
            params![now, id, owner],
        )?;
        if affected == 0 {
            return Ok(None);
        }

        let updated = fetch_content(&tx, &id, &owner)?;
        tx.commit()?;
        Ok(updated)
    }

    /// Delete a content item scoped to the owner, returning the deleted
    /// record. Returns `None` when the id does not exist or is owned by
    /// someone else.
    pub fn delete_content(
        &mut self,
        content_id: Ulid,
        owner_id: Ulid,
    ) -> Result<Option<Content>, StoreError> {
        let tx = self.conn.transaction()?;
        let id = content_id.to_string();
        let owner = owner_id.to_string();

        let Some(content) = fetch_content(&tx, &id, &owner)? else {
            return Ok(None);
        };

        tx.execute(
            "DELETE FROM content WHERE content_id = ?1 AND owner_id = ?2",
            params![id, owner],
        )?;
        tx.commit()?;
        Ok(Some(content))
    }

    /// Set the visibility of a content item, scoped to the owner. The
    /// first transition to public assigns a fresh shareable id; the id
    /// is retained across every later toggle and never regenerated.
    /// Load, assignment, and persist run in one transaction.
    pub fn set_visibility(
        &mut self,
        content_id: Ulid,
        owner_id: Ulid,
        is_public: bool,
    ) -> Result<Option<Content>, StoreError> {
        let tx = self.conn.transaction()?;
        let id = content_id.to_string();
        let owner = owner_id.to_string();

        let Some(mut content) = fetch_content(&tx, &id, &owner)? else {
            return Ok(None);
        };

        if is_public && content.shareable_id.is_none() {
            content.shareable_id = Some(Uuid::new_v4());
        }
        content.is_public = is_public;
        content.updated_at = Utc::now();

        tx.execute(
            "UPDATE content SET is_public = ?1, shareable_id = ?2, updated_at = ?3
             WHERE content_id = ?4 AND owner_id = ?5",
            params![
                content.is_public,
                content.shareable_id.map(|u| u.to_string()),
                content.updated_at.to_rfc3339(),
                id,
                owner
            ],
        )?;
        tx.commit()?;
        Ok(Some(content))
    }

    /// Unauthenticated shared read: resolves a shareable id only while
    /// the item is public. A retained id on a re-privated item yields
    /// `None`.
    pub fn find_shared(&self, shareable_id: Uuid) -> Result<Option<Content>, StoreError> {
        let content = self
            .conn
            .query_row(
                "SELECT content_id, owner_id, title, link, notes, tags, is_public,
                        shareable_id, created_at, updated_at
                 FROM content WHERE shareable_id = ?1 AND is_public = 1",
                params![shareable_id.to_string()],
                row_to_content,
            )
            .optional()?;
        Ok(content)
    }
}

/// Load one content row scoped by id and owner.
fn fetch_content(
    conn: &Connection,
    content_id: &str,
    owner_id: &str,
) -> Result<Option<Content>, StoreError> {
    let content = conn
        .query_row(
            "SELECT content_id, owner_id, title, link, notes, tags, is_public,
                    shareable_id, created_at, updated_at
             FROM content WHERE content_id = ?1 AND owner_id = ?2",
            params![content_id, owner_id],
            row_to_content,
        )
        .optional()?;
    Ok(content)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: parse_ulid(row, 0)?,
        user_name: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: parse_timestamp(row, 3)?,
    })
}

fn row_to_content(row: &Row<'_>) -> rusqlite::Result<Content> {
    let tags_json: String = row.get(5)?;
    let tags: Vec<String> = serde_json::from_str(&tags_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

    let shareable: Option<String> = row.get(7)?;
    let shareable_id = shareable
        .map(|s| {
            s.parse::<Uuid>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e))
            })
        })
        .transpose()?;

    Ok(Content {
        id: parse_ulid(row, 0)?,
        owner_id: parse_ulid(row, 1)?,
        title: row.get(2)?,
        link: row.get(3)?,
        notes: row.get(4)?,
        tags,
        is_public: row.get(6)?,
        shareable_id,
        created_at: parse_timestamp(row, 8)?,
        updated_at: parse_timestamp(row, 9)?,
    })
}

fn parse_ulid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Ulid> {
    let raw: String = row.get(idx)?;
    raw.parse::<Ulid>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
