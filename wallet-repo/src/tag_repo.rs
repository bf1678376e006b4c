use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Tag {
    pub id: i32,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewTag {
    pub title: String,
}

impl NewTag {
    pub fn new(title: String) -> Self {
        NewTag { title }
    }
}

#[derive(Error, Debug)]
pub enum TagRepoError {
    #[error("Tag with id {0} not found")]
    TagNotFound(i32),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait TagRepo: Sync + Send {
    async fn get_tag(&self, tag_id: i32) -> Result<Tag, TagRepoError>;

    async fn get_tags(&self) -> Result<Vec<Tag>, TagRepoError>;

    async fn create_tag(&self, new_tag: NewTag) -> Result<Tag, TagRepoError>;

    async fn update_tag(&self, tag_id: i32, tag: NewTag) -> Result<Tag, TagRepoError>;

    /// Deletes the tag and detaches it from every transaction.
    async fn delete_tag(&self, tag_id: i32) -> Result<Tag, TagRepoError>;
}
