use std::sync::Arc;

use chrono::Utc;
use models::category;
use tracing::{info, instrument, warn};

use super::domain::{CategoryChanges, NewCategory};
use crate::errors::ServiceError;
use crate::gateway::{CategoryFilter, CategoryInsert, CategoryRepository, ProductFilter, ProductRepository};
use crate::locks::{KeyedLocks, LockKey};
use crate::pagination::{Page, Pagination};

/// Category business service independent of web framework
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    products: Arc<dyn ProductRepository>,
    locks: Arc<KeyedLocks>,
}

impl CategoryService {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        products: Arc<dyn ProductRepository>,
        locks: Arc<KeyedLocks>,
    ) -> Self {
        Self { categories, products, locks }
    }

    /// Create a category with a name no other category uses.
    ///
    /// # Examples
    /// ```
    /// use service::catalog::Catalog;
    /// use service::category::domain::NewCategory;
    /// use service::gateway::Repositories;
    /// let catalog = Catalog::new(Repositories::in_memory());
    /// let c = tokio_test::block_on(catalog.categories.create(NewCategory::new("Electronics", None))).unwrap();
    /// assert_eq!(c.name, "Electronics");
    /// assert!(c.active);
    /// ```
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: NewCategory) -> Result<category::Model, ServiceError> {
        category::validate(&input.name, input.description.as_deref())?;
        let _guard = self.locks.lock(LockKey::CategoryName(input.name.clone())).await;
        if self.name_exists(&input.name, None).await? {
            warn!("category name already taken");
            return Err(ServiceError::DuplicateName(format!("category '{}' already exists", input.name)));
        }
        let created = self
            .categories
            .insert(CategoryInsert {
                name: input.name,
                description: input.description,
                active: input.active,
                created_at: Utc::now().into(),
            })
            .await?;
        info!(category_id = created.id, "category_created");
        Ok(created)
    }

    /// Overwrite name, description and active of an existing category.
    #[instrument(skip(self, changes), fields(category_id = changes.id, name = %changes.name))]
    pub async fn update(&self, changes: CategoryChanges) -> Result<category::Model, ServiceError> {
        category::validate(&changes.name, changes.description.as_deref())?;
        let mut current = self.categories.find_by_id(changes.id).await?.ok_or_else(|| ServiceError::not_found("category"))?;
        let _guard = self.locks.lock(LockKey::CategoryName(changes.name.clone())).await;
        if self.name_exists(&changes.name, Some(changes.id)).await? {
            warn!("category name already taken");
            return Err(ServiceError::DuplicateName(format!("category '{}' already exists", changes.name)));
        }
        current.name = changes.name;
        current.description = changes.description;
        current.active = changes.active;
        let updated = self.categories.update(current).await?;
        info!("category_updated");
        Ok(updated)
    }

    /// Remove a category that no product references. `Ok(false)` if it did not exist.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let _guard = self.locks.lock(LockKey::Category(id)).await;
        if self.has_dependents(id).await? {
            warn!("category still referenced by products");
            return Err(ServiceError::HasDependents(id));
        }
        let removed = self.categories.remove(id).await?;
        if removed {
            info!("category_deleted");
        }
        Ok(removed)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<category::Model>, ServiceError> {
        self.categories.find_by_id(id).await
    }

    /// Exact, case-sensitive lookup.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<category::Model>, ServiceError> {
        let filter = CategoryFilter::NameEquals { name: name.to_string(), exclude_id: None };
        Ok(self.categories.query_where(filter, None).await?.into_iter().next())
    }

    pub async fn exists(&self, id: i32) -> Result<bool, ServiceError> {
        Ok(self.categories.find_by_id(id).await?.is_some())
    }

    pub async fn list_all(&self) -> Result<Vec<category::Model>, ServiceError> {
        self.categories.query_all(None).await
    }

    /// Categories whose name or description contains `term`, case-sensitive.
    pub async fn search(&self, term: &str) -> Result<Vec<category::Model>, ServiceError> {
        self.categories.query_where(CategoryFilter::Contains(term.to_string()), None).await
    }

    pub async fn has_dependents(&self, category_id: i32) -> Result<bool, ServiceError> {
        Ok(self.products.count(Some(ProductFilter::InCategory(category_id))).await? > 0)
    }

    /// Whether another category already uses `name`, ignoring `exclude_id`.
    pub async fn name_exists(&self, name: &str, exclude_id: Option<i32>) -> Result<bool, ServiceError> {
        let filter = CategoryFilter::NameEquals { name: name.to_string(), exclude_id };
        Ok(self.categories.count(Some(filter)).await? > 0)
    }

    pub async fn list_page(&self, pagination: Pagination) -> Result<Page<category::Model>, ServiceError> {
        let total = self.categories.count(None).await?;
        let items = self.categories.query_all(Some(pagination.window())).await?;
        Ok(pagination.page(items, total))
    }

    pub async fn search_page(&self, term: &str, pagination: Pagination) -> Result<Page<category::Model>, ServiceError> {
        let filter = CategoryFilter::Contains(term.to_string());
        let total = self.categories.count(Some(filter.clone())).await?;
        let items = self.categories.query_where(filter, Some(pagination.window())).await?;
        Ok(pagination.page(items, total))
    }

    pub async fn count(&self) -> Result<u64, ServiceError> {
        self.categories.count(None).await
    }
}
