use crate::category_repo::CategoryRepoError::{CategoryInUse, CategoryNotFound};
use crate::category_repo::{Category, CategoryRepo, CategoryRepoError, NewCategory};
use crate::page::{PageOptions, Paginated};
use crate::sqlx_repo::SQLxRepo;
use anyhow::Context;
use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar, Postgres, QueryBuilder};
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct CategoryEntry {
    id: i32,
    title: String,
}

impl From<CategoryEntry> for Category {
    fn from(value: CategoryEntry) -> Self {
        Category {
            id: value.id,
            title: value.title,
        }
    }
}

#[async_trait]
impl CategoryRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_category(&self, category_id: i32) -> Result<Category, CategoryRepoError> {
        let category: Option<CategoryEntry> =
            query_as("SELECT id, title FROM categories WHERE id = $1")
                .bind(category_id)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("Unable to get category {}", category_id))?;
        category
            .map(|c| c.into())
            .ok_or(CategoryNotFound(category_id))
    }

    #[instrument(skip(self))]
    async fn get_categories(
        &self,
        page_options: Option<PageOptions>,
    ) -> Result<Paginated<Category>, CategoryRepoError> {
        let total: i64 = query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await
            .context("Unable to count categories")?;

        let mut query_builder =
            QueryBuilder::<Postgres>::new("SELECT id, title FROM categories ORDER BY id");
        if let Some(po) = page_options {
            query_builder
                .push(" OFFSET ")
                .push_bind(po.offset)
                .push(" LIMIT ")
                .push_bind(po.limit);
        }
        let categories: Vec<CategoryEntry> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .context("Unable to get categories")?;

        Ok(Paginated::new(
            categories.into_iter().map(|c| c.into()).collect(),
            total,
        ))
    }

    #[instrument(skip(self))]
    async fn create_category(
        &self,
        new_category: NewCategory,
    ) -> Result<Category, CategoryRepoError> {
        let id: i32 = query_scalar("INSERT INTO categories(title) VALUES ($1) RETURNING id")
            .bind(&new_category.title)
            .fetch_one(&self.pool)
            .await
            .context("Unable to insert category")?;

        Ok(new_category.to_category(id))
    }

    #[instrument(skip(self))]
    async fn update_category(
        &self,
        category_id: i32,
        category: NewCategory,
    ) -> Result<Category, CategoryRepoError> {
        let result = query("UPDATE categories SET title = $1 WHERE id = $2")
            .bind(&category.title)
            .bind(category_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Unable to update category {}", category_id))?;
        if result.rows_affected() == 0 {
            return Err(CategoryNotFound(category_id));
        }

        Ok(category.to_category(category_id))
    }

    #[instrument(skip(self))]
    async fn delete_category(&self, category_id: i32) -> Result<Category, CategoryRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to begin database transaction")?;

        let in_use: bool =
            query_scalar("SELECT EXISTS(SELECT 1 FROM transactions WHERE category_id = $1)")
                .bind(category_id)
                .fetch_one(&mut *tx)
                .await
                .with_context(|| format!("Unable to check usage of category {}", category_id))?;
        if in_use {
            return Err(CategoryInUse(category_id));
        }

        let category: Option<CategoryEntry> =
            query_as("DELETE FROM categories WHERE id = $1 RETURNING id, title")
                .bind(category_id)
                .fetch_optional(&mut *tx)
                .await
                .with_context(|| format!("Unable to delete category {}", category_id))?;
        let category = category.ok_or(CategoryNotFound(category_id))?;
        tx.commit()
            .await
            .context("Unable to commit database transaction")?;

        Ok(category.into())
    }
}
