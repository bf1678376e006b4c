use crate::page::{PageOptions, Paginated};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Category {
    pub id: i32,
    pub title: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewCategory {
    pub title: String,
}

impl NewCategory {
    pub fn new(title: String) -> Self {
        NewCategory { title }
    }

    pub fn to_category(self, id: i32) -> Category {
        Category {
            id,
            title: self.title,
        }
    }
}

#[derive(Error, Debug)]
pub enum CategoryRepoError {
    #[error("Category with id {0} not found")]
    CategoryNotFound(i32),
    #[error("Category with id {0} is used by transactions")]
    CategoryInUse(i32),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait CategoryRepo: Sync + Send {
    async fn get_category(&self, category_id: i32) -> Result<Category, CategoryRepoError>;

    async fn get_categories(
        &self,
        page_options: Option<PageOptions>,
    ) -> Result<Paginated<Category>, CategoryRepoError>;

    async fn create_category(
        &self,
        new_category: NewCategory,
    ) -> Result<Category, CategoryRepoError>;

    async fn update_category(
        &self,
        category_id: i32,
        category: NewCategory,
    ) -> Result<Category, CategoryRepoError>;

    async fn delete_category(&self, category_id: i32) -> Result<Category, CategoryRepoError>;
}
