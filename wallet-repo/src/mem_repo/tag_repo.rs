use crate::mem_repo::MemRepo;
use crate::tag_repo::TagRepoError::TagNotFound;
use crate::tag_repo::{NewTag, Tag, TagRepo, TagRepoError};
use async_trait::async_trait;
use chrono::Utc;

#[async_trait]
impl TagRepo for MemRepo {
    async fn get_tag(&self, tag_id: i32) -> Result<Tag, TagRepoError> {
        let read_guard = self.read_lock()?;

        read_guard
            .tags
            .get(&tag_id)
            .cloned()
            .ok_or(TagNotFound(tag_id))
    }

    async fn get_tags(&self) -> Result<Vec<Tag>, TagRepoError> {
        let read_guard = self.read_lock()?;

        Ok(read_guard.tags.values().cloned().collect())
    }

    async fn create_tag(&self, new_tag: NewTag) -> Result<Tag, TagRepoError> {
        let mut write_guard = self.write_lock()?;

        let id = write_guard.tag_ids.next();
        let now = Utc::now();
        let tag = Tag {
            id,
            title: new_tag.title,
            created_at: now,
            updated_at: now,
        };
        write_guard.tags.insert(id, tag.clone());

        Ok(tag)
    }

    async fn update_tag(&self, tag_id: i32, tag: NewTag) -> Result<Tag, TagRepoError> {
        let mut write_guard = self.write_lock()?;

        let Some(stored) = write_guard.tags.get_mut(&tag_id) else {
            return Err(TagNotFound(tag_id));
        };
        stored.title = tag.title;
        stored.updated_at = Utc::now();

        Ok(stored.clone())
    }

    async fn delete_tag(&self, tag_id: i32) -> Result<Tag, TagRepoError> {
        let mut write_guard = self.write_lock()?;

        let tag = write_guard
            .tags
            .remove(&tag_id)
            .ok_or(TagNotFound(tag_id))?;
        for transaction in write_guard.transactions.values_mut() {
            transaction.tags.remove(&tag_id);
        }

        Ok(tag)
    }
}
