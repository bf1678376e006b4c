use crate::sqlx_repo::SQLxRepo;
use crate::tag_repo::TagRepoError::TagNotFound;
use crate::tag_repo::{NewTag, Tag, TagRepo, TagRepoError};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::query_as;
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct TagEntry {
    id: i32,
    title: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TagEntry> for Tag {
    fn from(value: TagEntry) -> Self {
        Tag {
            id: value.id,
            title: value.title,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[async_trait]
impl TagRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_tag(&self, tag_id: i32) -> Result<Tag, TagRepoError> {
        let tag: Option<TagEntry> = query_as("SELECT * FROM tags WHERE id = $1")
            .bind(tag_id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Unable to get tag {}", tag_id))?;
        tag.map(|t| t.into()).ok_or(TagNotFound(tag_id))
    }

    #[instrument(skip(self))]
    async fn get_tags(&self) -> Result<Vec<Tag>, TagRepoError> {
        let tags: Vec<TagEntry> = query_as("SELECT * FROM tags ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Unable to get tags")?;
        Ok(tags.into_iter().map(|t| t.into()).collect())
    }

    #[instrument(skip(self))]
    async fn create_tag(&self, new_tag: NewTag) -> Result<Tag, TagRepoError> {
        let tag: TagEntry = query_as("INSERT INTO tags(title) VALUES ($1) RETURNING *")
            .bind(&new_tag.title)
            .fetch_one(&self.pool)
            .await
            .context("Unable to insert tag")?;
        Ok(tag.into())
    }

    #[instrument(skip(self))]
    async fn update_tag(&self, tag_id: i32, tag: NewTag) -> Result<Tag, TagRepoError> {
        let tag: Option<TagEntry> =
            query_as("UPDATE tags SET title = $1, updated_at = now() WHERE id = $2 RETURNING *")
                .bind(&tag.title)
                .bind(tag_id)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("Unable to update tag {}", tag_id))?;
        tag.map(|t| t.into()).ok_or(TagNotFound(tag_id))
    }

    /// Links in transactions_tags are removed by the ON DELETE CASCADE.
    #[instrument(skip(self))]
    async fn delete_tag(&self, tag_id: i32) -> Result<Tag, TagRepoError> {
        let tag: Option<TagEntry> = query_as("DELETE FROM tags WHERE id = $1 RETURNING *")
            .bind(tag_id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Unable to delete tag {}", tag_id))?;
        tag.map(|t| t.into()).ok_or(TagNotFound(tag_id))
    }
}
