//! Favorite tag repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use sixten_core::{Error, FavoriteTag, FavoriteTagRepository, OwnerId, Result};

fn map_row_to_favorite(row: &PgRow) -> FavoriteTag {
    FavoriteTag {
        id: row.get("id"),
        user_id: row.get("user_id"),
        tag_name: row.get("tag_name"),
        created_at: row.get("created_at"),
    }
}

/// PostgreSQL implementation of FavoriteTagRepository.
pub struct PgFavoriteTagRepository {
    pool: Pool<Postgres>,
}

impl PgFavoriteTagRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FavoriteTagRepository for PgFavoriteTagRepository {
    async fn list(&self, owner: &OwnerId) -> Result<Vec<FavoriteTag>> {
        let rows = sqlx::query(
            "SELECT id, user_id, tag_name, created_at FROM favorite_tags
             WHERE user_id = $1 ORDER BY tag_name",
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(map_row_to_favorite).collect())
    }

    async fn add(&self, owner: &OwnerId, name: &str) -> Result<FavoriteTag> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let row = sqlx::query(
            "INSERT INTO favorite_tags (id, user_id, tag_name, created_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id, tag_name) DO UPDATE SET tag_name = EXCLUDED.tag_name
             RETURNING id, user_id, tag_name, created_at",
        )
        .bind(Uuid::now_v7())
        .bind(owner.as_str())
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_row_to_favorite(&row))
    }

    async fn remove(&self, owner: &OwnerId, name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM favorite_tags WHERE user_id = $1 AND tag_name = $2")
            .bind(owner.as_str())
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }
}
