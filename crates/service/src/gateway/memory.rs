//! In-memory backend used by tests and the default demo configuration.
//!
//! Mirrors the relational schema's constraints: unique category names, unique
//! `(category_id, name)` for products, and a restricting foreign key from
//! product to category. Whenever both tables are needed the category table is
//! locked first.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use models::{category, product::{self, ProductDetail}};
use tokio::sync::RwLock;

use super::{CategoryFilter, CategoryInsert, CategoryRepository, ProductFilter, ProductInsert, ProductRepository};
use crate::errors::ServiceError;
use crate::pagination::Window;

#[derive(Default)]
pub struct MemoryDatabase {
    categories: RwLock<BTreeMap<i32, category::Model>>,
    products: RwLock<BTreeMap<i32, product::Model>>,
    next_category_id: AtomicI32,
    next_product_id: AtomicI32,
}

impl MemoryDatabase {
    pub fn new() -> Self { Self::default() }
}

fn category_matches(c: &category::Model, filter: &CategoryFilter) -> bool {
    match filter {
        CategoryFilter::NameEquals { name, exclude_id } => c.name == *name && Some(c.id) != *exclude_id,
        CategoryFilter::Contains(term) => c.matches(term),
    }
}

fn product_matches(d: &ProductDetail, filter: &ProductFilter) -> bool {
    let p = &d.product;
    match filter {
        ProductFilter::InCategory(category_id) => p.category_id == *category_id,
        ProductFilter::NameInCategory { name, category_id, exclude_id } => {
            p.name == *name && p.category_id == *category_id && Some(p.id) != *exclude_id
        }
        ProductFilter::Search(needle) => d.matches_lowercase(needle),
    }
}

fn sorted_categories<'a>(rows: impl Iterator<Item = &'a category::Model>) -> Vec<category::Model> {
    let mut out: Vec<category::Model> = rows.cloned().collect();
    out.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    out
}

fn window_or_all<T>(rows: Vec<T>, window: Option<Window>) -> Vec<T> {
    match window {
        Some(w) => w.apply(rows),
        None => rows,
    }
}

impl MemoryDatabase {
    /// Joined, ordered product rows passing `filter`.
    async fn product_details(&self, filter: Option<&ProductFilter>) -> Vec<ProductDetail> {
        let categories = self.categories.read().await;
        let products = self.products.read().await;
        let mut out: Vec<ProductDetail> = products
            .values()
            .map(|p| ProductDetail { product: p.clone(), category: categories.get(&p.category_id).cloned() })
            .filter(|d| filter.map_or(true, |f| product_matches(d, f)))
            .collect();
        out.sort_by(|a, b| a.product.name.cmp(&b.product.name).then(a.product.id.cmp(&b.product.id)));
        out
    }
}

#[async_trait]
impl CategoryRepository for MemoryDatabase {
    async fn insert(&self, row: CategoryInsert) -> Result<category::Model, ServiceError> {
        let mut categories = self.categories.write().await;
        if categories.values().any(|c| c.name == row.name) {
            return Err(ServiceError::DuplicateName(format!("category '{}' already exists", row.name)));
        }
        let id = self.next_category_id.fetch_add(1, Ordering::SeqCst) + 1;
        let model = category::Model {
            id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            active: row.active,
        };
        categories.insert(id, model.clone());
        Ok(model)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<category::Model>, ServiceError> {
        Ok(self.categories.read().await.get(&id).cloned())
    }

    async fn update(&self, model: category::Model) -> Result<category::Model, ServiceError> {
        let mut categories = self.categories.write().await;
        if !categories.contains_key(&model.id) {
            return Err(ServiceError::not_found("category"));
        }
        if categories.values().any(|c| c.name == model.name && c.id != model.id) {
            return Err(ServiceError::DuplicateName(format!("category '{}' already exists", model.name)));
        }
        let stored = categories.get_mut(&model.id).ok_or_else(|| ServiceError::not_found("category"))?;
        stored.name = model.name;
        stored.description = model.description;
        stored.active = model.active;
        Ok(stored.clone())
    }

    async fn remove(&self, id: i32) -> Result<bool, ServiceError> {
        let mut categories = self.categories.write().await;
        let products = self.products.read().await;
        if products.values().any(|p| p.category_id == id) {
            return Err(ServiceError::HasDependents(id));
        }
        Ok(categories.remove(&id).is_some())
    }

    async fn query_all(&self, window: Option<Window>) -> Result<Vec<category::Model>, ServiceError> {
        let categories = self.categories.read().await;
        Ok(window_or_all(sorted_categories(categories.values()), window))
    }

    async fn query_where(&self, filter: CategoryFilter, window: Option<Window>) -> Result<Vec<category::Model>, ServiceError> {
        let categories = self.categories.read().await;
        let rows = sorted_categories(categories.values().filter(|c| category_matches(c, &filter)));
        Ok(window_or_all(rows, window))
    }

    async fn count(&self, filter: Option<CategoryFilter>) -> Result<u64, ServiceError> {
        let categories = self.categories.read().await;
        let n = match &filter {
            Some(f) => categories.values().filter(|c| category_matches(c, f)).count(),
            None => categories.len(),
        };
        Ok(n as u64)
    }
}

#[async_trait]
impl ProductRepository for MemoryDatabase {
    async fn insert(&self, row: ProductInsert) -> Result<product::Model, ServiceError> {
        let categories = self.categories.read().await;
        let mut products = self.products.write().await;
        if !categories.contains_key(&row.category_id) {
            return Err(ServiceError::InvalidCategory(row.category_id));
        }
        if products.values().any(|p| p.category_id == row.category_id && p.name == row.name) {
            return Err(ServiceError::DuplicateName(format!("product '{}' already exists in this category", row.name)));
        }
        let id = self.next_product_id.fetch_add(1, Ordering::SeqCst) + 1;
        let model = product::Model {
            id,
            name: row.name,
            description: row.description,
            price: row.price,
            stock: row.stock,
            created_at: row.created_at,
            category_id: row.category_id,
        };
        products.insert(id, model.clone());
        Ok(model)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<ProductDetail>, ServiceError> {
        let categories = self.categories.read().await;
        let products = self.products.read().await;
        Ok(products.get(&id).map(|p| ProductDetail {
            product: p.clone(),
            category: categories.get(&p.category_id).cloned(),
        }))
    }

    async fn update(&self, model: product::Model) -> Result<product::Model, ServiceError> {
        let categories = self.categories.read().await;
        let mut products = self.products.write().await;
        if !products.contains_key(&model.id) {
            return Err(ServiceError::not_found("product"));
        }
        if !categories.contains_key(&model.category_id) {
            return Err(ServiceError::InvalidCategory(model.category_id));
        }
        if products
            .values()
            .any(|p| p.id != model.id && p.category_id == model.category_id && p.name == model.name)
        {
            return Err(ServiceError::DuplicateName(format!("product '{}' already exists in this category", model.name)));
        }
        let stored = products.get_mut(&model.id).ok_or_else(|| ServiceError::not_found("product"))?;
        stored.name = model.name;
        stored.description = model.description;
        stored.price = model.price;
        stored.stock = model.stock;
        stored.category_id = model.category_id;
        Ok(stored.clone())
    }

    async fn remove(&self, id: i32) -> Result<bool, ServiceError> {
        Ok(self.products.write().await.remove(&id).is_some())
    }

    async fn query_all(&self, window: Option<Window>) -> Result<Vec<ProductDetail>, ServiceError> {
        Ok(window_or_all(self.product_details(None).await, window))
    }

    async fn query_where(&self, filter: ProductFilter, window: Option<Window>) -> Result<Vec<ProductDetail>, ServiceError> {
        Ok(window_or_all(self.product_details(Some(&filter)).await, window))
    }

    async fn count(&self, filter: Option<ProductFilter>) -> Result<u64, ServiceError> {
        let n = match &filter {
            Some(f) => self.product_details(Some(f)).await.len(),
            None => self.products.read().await.len(),
        };
        Ok(n as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn category_row(name: &str) -> CategoryInsert {
        CategoryInsert { name: name.into(), description: None, active: true, created_at: Utc::now().into() }
    }

    fn product_row(name: &str, category_id: i32) -> ProductInsert {
        ProductInsert {
            name: name.into(),
            description: None,
            price: Decimal::new(100, 0),
            stock: 1,
            category_id,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn ids_are_assigned_sequentially() {
        let db = MemoryDatabase::new();
        let a = CategoryRepository::insert(&db, category_row("A")).await.unwrap();
        let b = CategoryRepository::insert(&db, category_row("B")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        let p = ProductRepository::insert(&db, product_row("x", a.id)).await.unwrap();
        assert_eq!(p.id, 1);
    }

    #[tokio::test]
    async fn restricting_foreign_key_blocks_category_removal() {
        let db = MemoryDatabase::new();
        let c = CategoryRepository::insert(&db, category_row("Home")).await.unwrap();
        let p = ProductRepository::insert(&db, product_row("Sofa", c.id)).await.unwrap();
        assert!(matches!(CategoryRepository::remove(&db, c.id).await, Err(ServiceError::HasDependents(id)) if id == c.id));
        assert!(ProductRepository::remove(&db, p.id).await.unwrap());
        assert!(CategoryRepository::remove(&db, c.id).await.unwrap());
        assert!(!CategoryRepository::remove(&db, c.id).await.unwrap());
    }

    #[tokio::test]
    async fn product_insert_requires_existing_category() {
        let db = MemoryDatabase::new();
        let err = ProductRepository::insert(&db, product_row("Ghost", 99)).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCategory(99)));
    }

    #[tokio::test]
    async fn listings_are_ordered_by_name_then_id() {
        let db = MemoryDatabase::new();
        for name in ["Zeta", "Alpha", "Mid"] {
            CategoryRepository::insert(&db, category_row(name)).await.unwrap();
        }
        let names: Vec<String> = CategoryRepository::query_all(&db, None).await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, ["Alpha", "Mid", "Zeta"]);

        let window = Window { offset: 1, limit: 1 };
        let page = CategoryRepository::query_all(&db, Some(window)).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "Mid");
    }

    #[tokio::test]
    async fn update_keeps_id_and_creation_time() {
        let db = MemoryDatabase::new();
        let c = CategoryRepository::insert(&db, category_row("Home")).await.unwrap();
        let mut changed = c.clone();
        changed.name = "House".into();
        changed.active = false;
        changed.created_at = (Utc::now() + chrono::Duration::days(3)).into();
        let updated = CategoryRepository::update(&db, changed).await.unwrap();
        assert_eq!(updated.id, c.id);
        assert_eq!(updated.created_at, c.created_at);
        assert_eq!(updated.name, "House");
        assert!(!updated.active);
    }

    #[tokio::test]
    async fn product_reads_join_the_category() {
        let db = MemoryDatabase::new();
        let c = CategoryRepository::insert(&db, category_row("Frozen")).await.unwrap();
        let p = ProductRepository::insert(&db, product_row("Ice cream", c.id)).await.unwrap();
        let detail = ProductRepository::find_by_id(&db, p.id).await.unwrap().unwrap();
        assert_eq!(detail.category.map(|c| c.name), Some("Frozen".to_string()));

        let found = ProductRepository::query_where(&db, ProductFilter::Search("froz".into()), None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(ProductRepository::count(&db, Some(ProductFilter::InCategory(c.id))).await.unwrap(), 1);
        assert_eq!(ProductRepository::count(&db, Some(ProductFilter::InCategory(c.id + 1))).await.unwrap(), 0);
    }
}
