//! Link repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use sixten_core::{
    Error, Link, LinkFilter, LinkRepository, LinkStatus, NewLink, OwnerId, Result,
};

use crate::tags::{insert_tags, tags_for_links};

const LINK_COLUMNS: &str = "id, user_id, url, title, summary, content_type, estimated_minutes, \
     status, note, image_data, manual_content, created_at, updated_at";

fn map_row_to_link(row: &PgRow) -> Result<Link> {
    let content_type: String = row.get("content_type");
    let status: String = row.get("status");
    Ok(Link {
        id: row.get("id"),
        user_id: row.get("user_id"),
        url: row.get("url"),
        title: row.get("title"),
        summary: row.get("summary"),
        content_type: content_type.parse()?,
        estimated_minutes: row.get("estimated_minutes"),
        status: status.parse()?,
        note: row.get("note"),
        image_data: row.get("image_data"),
        manual_content: row.get("manual_content"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        tags: Vec::new(),
    })
}

/// PostgreSQL implementation of LinkRepository.
pub struct PgLinkRepository {
    pool: Pool<Postgres>,
}

impl PgLinkRepository {
    /// Create a new PgLinkRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Attach tags to a batch of links with one tag query.
    async fn attach_tags(&self, mut links: Vec<Link>) -> Result<Vec<Link>> {
        let ids: Vec<Uuid> = links.iter().map(|l| l.id).collect();
        let mut grouped = tags_for_links(&self.pool, &ids).await?;
        for link in &mut links {
            link.tags = grouped.remove(&link.id).unwrap_or_default();
        }
        Ok(links)
    }

    async fn attach_tags_one(&self, link: Link) -> Result<Link> {
        let mut links = self.attach_tags(vec![link]).await?;
        links
            .pop()
            .ok_or_else(|| Error::Internal("tag attachment lost the link".to_string()))
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, owner: &OwnerId, new: NewLink) -> Result<Link> {
        let id = Uuid::now_v7();
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let row = sqlx::query(&format!(
            "INSERT INTO links (id, user_id, url, title, summary, content_type, estimated_minutes,
                                status, note, image_data, manual_content, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'inbox', NULL, $8, $9, $10, $10)
             RETURNING {LINK_COLUMNS}"
        ))
        .bind(id)
        .bind(owner.as_str())
        .bind(&new.url)
        .bind(&new.title)
        .bind(&new.summary)
        .bind(new.content_type.as_str())
        .bind(new.estimated_minutes)
        .bind(&new.image_data)
        .bind(&new.manual_content)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        let mut link = map_row_to_link(&row)?;

        let drafts: Vec<(String, bool)> = new
            .tags
            .iter()
            .map(|t| (t.name.clone(), t.ai_suggested))
            .collect();
        link.tags = insert_tags(&mut tx, id, &drafts).await?;

        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "links",
            op = "create",
            link_id = %id,
            tag_count = link.tags.len(),
            "Link created"
        );
        Ok(link)
    }

    async fn get(&self, owner: &OwnerId, id: Uuid) -> Result<Option<Link>> {
        let row = sqlx::query(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(owner.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(row) => Ok(Some(self.attach_tags_one(map_row_to_link(&row)?).await?)),
            None => Ok(None),
        }
    }

    async fn list(&self, owner: &OwnerId, filter: &LinkFilter) -> Result<Vec<Link>> {
        let mut sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE user_id = $1");
        let mut param = 1;

        if filter.status.is_some() {
            param += 1;
            sql.push_str(&format!(" AND status = ${}", param));
        } else if !filter.include_deleted {
            sql.push_str(" AND status <> 'deleted'");
        }
        if filter.tag.is_some() {
            param += 1;
            sql.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM tags t WHERE t.link_id = links.id \
                 AND lower(t.tag_name) = lower(${}))",
                param
            ));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");

        let mut query = sqlx::query(&sql).bind(owner.as_str());
        if let Some(status) = filter.status {
            query = query.bind(status.as_str());
        }
        if let Some(tag) = &filter.tag {
            query = query.bind(tag);
        }

        let rows = query.fetch_all(&self.pool).await.map_err(Error::Database)?;
        let links = rows
            .iter()
            .map(map_row_to_link)
            .collect::<Result<Vec<_>>>()?;

        self.attach_tags(links).await
    }

    async fn update_status(
        &self,
        owner: &OwnerId,
        id: Uuid,
        status: LinkStatus,
        note: Option<&str>,
    ) -> Result<Link> {
        let row = sqlx::query(&format!(
            "UPDATE links
             SET status = $3, note = COALESCE($4, note), updated_at = $5
             WHERE id = $1 AND user_id = $2
             RETURNING {LINK_COLUMNS}"
        ))
        .bind(id)
        .bind(owner.as_str())
        .bind(status.as_str())
        .bind(note)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::LinkNotFound(id))?;

        self.attach_tags_one(map_row_to_link(&row)?).await
    }

    async fn soft_delete(&self, owner: &OwnerId, id: Uuid) -> Result<()> {
        let result = sqlx::query(
            "UPDATE links SET status = 'deleted', updated_at = $3
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::LinkNotFound(id));
        }
        Ok(())
    }
}
