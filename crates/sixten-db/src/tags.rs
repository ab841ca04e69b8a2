//! Tag repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use sixten_core::{Error, OwnerId, Result, Tag, TagRepository};

const TAG_COLUMNS: &str = "id, link_id, tag_name, ai_suggested, created_at";

/// Postgres error code for unique violations.
const UNIQUE_VIOLATION: &str = "23505";

pub(crate) fn map_row_to_tag(row: &PgRow) -> Tag {
    Tag {
        id: row.get("id"),
        link_id: row.get("link_id"),
        tag_name: row.get("tag_name"),
        ai_suggested: row.get("ai_suggested"),
        created_at: row.get("created_at"),
    }
}

/// Map a unique violation on `(link_id, lower(tag_name))` to an input error.
pub(crate) fn map_tag_insert_error(e: sqlx::Error, name: &str) -> Error {
    let is_duplicate = e
        .as_database_error()
        .and_then(|d| d.code())
        .map(|c| c == UNIQUE_VIOLATION)
        .unwrap_or(false);
    if is_duplicate {
        Error::InvalidInput(format!("Tag '{}' is already on this link", name))
    } else {
        Error::Database(e)
    }
}

/// Insert tag rows for one link inside an open transaction.
pub(crate) async fn insert_tags(
    conn: &mut PgConnection,
    link_id: Uuid,
    tags: &[(String, bool)],
) -> Result<Vec<Tag>> {
    let now = Utc::now();
    let mut inserted = Vec::with_capacity(tags.len());
    for (name, ai_suggested) in tags {
        let row = sqlx::query(&format!(
            "INSERT INTO tags (id, link_id, tag_name, ai_suggested, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {TAG_COLUMNS}"
        ))
        .bind(Uuid::now_v7())
        .bind(link_id)
        .bind(name)
        .bind(ai_suggested)
        .bind(now)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| map_tag_insert_error(e, name))?;
        inserted.push(map_row_to_tag(&row));
    }
    Ok(inserted)
}

/// Load tags for many links in a single query, grouped by link.
pub(crate) async fn tags_for_links(
    pool: &Pool<Postgres>,
    link_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Tag>>> {
    let mut grouped: HashMap<Uuid, Vec<Tag>> = HashMap::new();
    if link_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = sqlx::query(&format!(
        "SELECT {TAG_COLUMNS} FROM tags
         WHERE link_id = ANY($1::uuid[])
         ORDER BY created_at, tag_name"
    ))
    .bind(link_ids)
    .fetch_all(pool)
    .await
    .map_err(Error::Database)?;

    for row in rows {
        let tag = map_row_to_tag(&row);
        grouped.entry(tag.link_id).or_default().push(tag);
    }
    Ok(grouped)
}

/// PostgreSQL implementation of TagRepository.
pub struct PgTagRepository {
    pool: Pool<Postgres>,
}

impl PgTagRepository {
    /// Create a new PgTagRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn add(
        &self,
        owner: &OwnerId,
        link_id: Uuid,
        name: &str,
        ai_suggested: bool,
    ) -> Result<Tag> {
        // The SELECT guards ownership: no row is inserted for a foreign link.
        let row = sqlx::query(&format!(
            "INSERT INTO tags (id, link_id, tag_name, ai_suggested, created_at)
             SELECT $1, l.id, $3, $4, $5 FROM links l
             WHERE l.id = $2 AND l.user_id = $6
             RETURNING {TAG_COLUMNS}"
        ))
        .bind(Uuid::now_v7())
        .bind(link_id)
        .bind(name)
        .bind(ai_suggested)
        .bind(Utc::now())
        .bind(owner.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_tag_insert_error(e, name))?;

        row.map(|r| map_row_to_tag(&r))
            .ok_or(Error::LinkNotFound(link_id))
    }

    async fn remove(&self, owner: &OwnerId, link_id: Uuid, tag_id: Uuid) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM tags t USING links l
             WHERE t.id = $1 AND t.link_id = $2 AND l.id = t.link_id AND l.user_id = $3",
        )
        .bind(tag_id)
        .bind(link_id)
        .bind(owner.as_str())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Tag {} on link {}", tag_id, link_id)));
        }
        Ok(())
    }

    async fn replace(
        &self,
        owner: &OwnerId,
        link_id: Uuid,
        names: &[String],
        ai_suggested: bool,
    ) -> Result<Vec<Tag>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let owned = sqlx::query("SELECT 1 FROM links WHERE id = $1 AND user_id = $2 FOR UPDATE")
            .bind(link_id)
            .bind(owner.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::Database)?;
        if owned.is_none() {
            return Err(Error::LinkNotFound(link_id));
        }

        sqlx::query("DELETE FROM tags WHERE link_id = $1")
            .bind(link_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let drafts: Vec<(String, bool)> = names.iter().map(|n| (n.clone(), ai_suggested)).collect();
        let tags = insert_tags(&mut tx, link_id, &drafts).await?;

        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "tags",
            op = "replace",
            link_id = %link_id,
            result_count = tags.len(),
            "Replaced link tags"
        );
        Ok(tags)
    }

    async fn list_names(&self, owner: &OwnerId) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT DISTINCT t.tag_name FROM tags t
             JOIN links l ON l.id = t.link_id
             WHERE l.user_id = $1 AND l.status <> 'deleted'
             ORDER BY t.tag_name",
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(|r| r.get("tag_name")).collect())
    }
}
