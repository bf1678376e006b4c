use crate::category_repo::CategoryRepoError::{CategoryInUse, CategoryNotFound};
use crate::category_repo::{Category, CategoryRepo, CategoryRepoError, NewCategory};
use crate::mem_repo::MemRepo;
use crate::page::{PageOptions, Paginated};
use async_trait::async_trait;

#[async_trait]
impl CategoryRepo for MemRepo {
    async fn get_category(&self, category_id: i32) -> Result<Category, CategoryRepoError> {
        let read_guard = self.read_lock()?;

        read_guard
            .categories
            .get(&category_id)
            .cloned()
            .ok_or(CategoryNotFound(category_id))
    }

    async fn get_categories(
        &self,
        page_options: Option<PageOptions>,
    ) -> Result<Paginated<Category>, CategoryRepoError> {
        let read_guard = self.read_lock()?;

        let total = read_guard.categories.len() as i64;
        let categories = read_guard.categories.values().cloned();
        let categories = match page_options {
            Some(page_options) => page_options.apply(categories),
            None => categories.collect(),
        };

        Ok(Paginated::new(categories, total))
    }

    async fn create_category(
        &self,
        new_category: NewCategory,
    ) -> Result<Category, CategoryRepoError> {
        let mut write_guard = self.write_lock()?;

        let id = write_guard.category_ids.next();
        let category = new_category.to_category(id);
        write_guard.categories.insert(id, category.clone());

        Ok(category)
    }

    async fn update_category(
        &self,
        category_id: i32,
        category: NewCategory,
    ) -> Result<Category, CategoryRepoError> {
        let mut write_guard = self.write_lock()?;

        let Some(stored) = write_guard.categories.get_mut(&category_id) else {
            return Err(CategoryNotFound(category_id));
        };
        *stored = category.to_category(category_id);

        Ok(stored.clone())
    }

    async fn delete_category(&self, category_id: i32) -> Result<Category, CategoryRepoError> {
        let mut write_guard = self.write_lock()?;

        if !write_guard.categories.contains_key(&category_id) {
            return Err(CategoryNotFound(category_id));
        }
        if write_guard
            .transactions
            .values()
            .any(|t| t.category_id == category_id)
        {
            return Err(CategoryInUse(category_id));
        }

        let category = write_guard
            .categories
            .remove(&category_id)
            .expect("category presence checked above");
        Ok(category)
    }
}
