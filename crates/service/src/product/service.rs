use std::sync::Arc;

use chrono::Utc;
use models::product::{self, ProductDetail};
use tracing::{debug, info, instrument, warn};

use super::domain::{NewProduct, ProductChanges};
use crate::errors::ServiceError;
use crate::gateway::{CategoryRepository, ProductFilter, ProductInsert, ProductRepository};
use crate::locks::{KeyedLocks, LockKey};
use crate::pagination::{Page, Pagination};
use crate::search::normalize_term;

/// Product business service independent of web framework
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    categories: Arc<dyn CategoryRepository>,
    locks: Arc<KeyedLocks>,
}

impl ProductService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        categories: Arc<dyn CategoryRepository>,
        locks: Arc<KeyedLocks>,
    ) -> Self {
        Self { products, categories, locks }
    }

    async fn ensure_category(&self, category_id: i32) -> Result<(), ServiceError> {
        if self.categories.find_by_id(category_id).await?.is_none() {
            warn!(category_id, "product references unknown category");
            return Err(ServiceError::InvalidCategory(category_id));
        }
        Ok(())
    }

    /// Create a product inside an existing category.
    ///
    /// # Examples
    /// ```
    /// use rust_decimal::Decimal;
    /// use service::catalog::Catalog;
    /// use service::category::domain::NewCategory;
    /// use service::product::domain::NewProduct;
    /// use service::gateway::Repositories;
    /// let catalog = Catalog::new(Repositories::in_memory());
    /// let c = tokio_test::block_on(catalog.categories.create(NewCategory::new("Electronics", None))).unwrap();
    /// let input = NewProduct { name: "Phone".into(), description: None, price: Decimal::new(59999, 2), stock: 5, category_id: c.id };
    /// let p = tokio_test::block_on(catalog.products.create(input)).unwrap();
    /// assert_eq!(p.category_id, c.id);
    /// ```
    #[instrument(skip(self, input), fields(name = %input.name, category_id = input.category_id))]
    pub async fn create(&self, input: NewProduct) -> Result<product::Model, ServiceError> {
        product::validate(&input.name, input.description.as_deref(), input.price, input.stock)?;
        let _category = self.locks.lock(LockKey::Category(input.category_id)).await;
        self.ensure_category(input.category_id).await?;
        let _name = self.locks.lock(LockKey::ProductName(input.category_id, input.name.clone())).await;
        if self.exists_name_in_category(&input.name, input.category_id, None).await? {
            warn!("product name already taken in category");
            return Err(ServiceError::DuplicateName(format!(
                "product '{}' already exists in category {}",
                input.name, input.category_id
            )));
        }
        let created = self
            .products
            .insert(ProductInsert {
                name: input.name,
                description: input.description,
                price: input.price,
                stock: input.stock,
                category_id: input.category_id,
                created_at: Utc::now().into(),
            })
            .await?;
        info!(product_id = created.id, "product_created");
        Ok(created)
    }

    /// Overwrite the mutable fields of a product; the uniqueness check uses
    /// the new category id.
    #[instrument(skip(self, changes), fields(product_id = changes.id, category_id = changes.category_id))]
    pub async fn update(&self, changes: ProductChanges) -> Result<product::Model, ServiceError> {
        product::validate(&changes.name, changes.description.as_deref(), changes.price, changes.stock)?;
        let current = self.products.find_by_id(changes.id).await?.ok_or_else(|| ServiceError::not_found("product"))?;
        let _category = self.locks.lock(LockKey::Category(changes.category_id)).await;
        self.ensure_category(changes.category_id).await?;
        let _name = self.locks.lock(LockKey::ProductName(changes.category_id, changes.name.clone())).await;
        if self.exists_name_in_category(&changes.name, changes.category_id, Some(changes.id)).await? {
            warn!("product name already taken in category");
            return Err(ServiceError::DuplicateName(format!(
                "product '{}' already exists in category {}",
                changes.name, changes.category_id
            )));
        }
        let mut model = current.product;
        model.name = changes.name;
        model.description = changes.description;
        model.price = changes.price;
        model.stock = changes.stock;
        model.category_id = changes.category_id;
        let updated = self.products.update(model).await?;
        info!("product_updated");
        Ok(updated)
    }

    /// `Ok(false)` when there was nothing to delete.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let removed = self.products.remove(id).await?;
        if removed {
            info!("product_deleted");
        }
        Ok(removed)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<ProductDetail>, ServiceError> {
        self.products.find_by_id(id).await
    }

    pub async fn exists(&self, id: i32) -> Result<bool, ServiceError> {
        Ok(self.products.find_by_id(id).await?.is_some())
    }

    pub async fn list_all(&self) -> Result<Vec<ProductDetail>, ServiceError> {
        self.products.query_all(None).await
    }

    /// Case-insensitive match on product name, description or category name.
    /// A blank term lists everything.
    pub async fn search(&self, term: &str) -> Result<Vec<ProductDetail>, ServiceError> {
        match normalize_term(term) {
            Some(needle) => self.products.query_where(ProductFilter::Search(needle), None).await,
            None => {
                debug!("blank search term, listing all products");
                self.list_all().await
            }
        }
    }

    pub async fn exists_name_in_category(
        &self,
        name: &str,
        category_id: i32,
        exclude_id: Option<i32>,
    ) -> Result<bool, ServiceError> {
        let filter = ProductFilter::NameInCategory { name: name.to_string(), category_id, exclude_id };
        Ok(self.products.count(Some(filter)).await? > 0)
    }

    pub async fn list_page(&self, pagination: Pagination) -> Result<Page<ProductDetail>, ServiceError> {
        let total = self.products.count(None).await?;
        let items = self.products.query_all(Some(pagination.window())).await?;
        Ok(pagination.page(items, total))
    }

    pub async fn search_page(&self, term: &str, pagination: Pagination) -> Result<Page<ProductDetail>, ServiceError> {
        let Some(needle) = normalize_term(term) else { return self.list_page(pagination).await };
        let filter = ProductFilter::Search(needle);
        let total = self.products.count(Some(filter.clone())).await?;
        let items = self.products.query_where(filter, Some(pagination.window())).await?;
        Ok(pagination.page(items, total))
    }

    pub async fn count(&self) -> Result<u64, ServiceError> {
        self.products.count(None).await
    }
}
