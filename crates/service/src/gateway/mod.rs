//! Persistence gateway: repository traits the services depend on, plus the two
//! backends implementing them.
//!
//! Filters are plain enums so each backend can evaluate them natively: the
//! memory backend in Rust, the SeaORM backend as SQL conditions.

pub mod memory;
pub mod seaorm;

use std::sync::Arc;

use async_trait::async_trait;
use configs::{DatabaseBackend, DatabaseConfig};
use migration::MigratorTrait;
use models::{category, product::{self, ProductDetail}};
use rust_decimal::Decimal;
use sea_orm::{prelude::DateTimeWithTimeZone, DatabaseConnection};
use tracing::info;

use crate::errors::ServiceError;
use crate::pagination::Window;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Exact, case-sensitive name match, optionally ignoring one id.
    NameEquals { name: String, exclude_id: Option<i32> },
    /// Name or description contains the term, case-sensitive.
    Contains(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProductFilter {
    InCategory(i32),
    NameInCategory { name: String, category_id: i32, exclude_id: Option<i32> },
    /// Lowercase term found in name, description or category name, ignoring case.
    Search(String),
}

/// Row data for a new category; the id comes from the store.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryInsert {
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
}

/// Row data for a new product; the id comes from the store.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductInsert {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub category_id: i32,
    pub created_at: DateTimeWithTimeZone,
}

/// Category storage. Listings are ordered by name, then id.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn insert(&self, row: CategoryInsert) -> Result<category::Model, ServiceError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<category::Model>, ServiceError>;
    /// Overwrite name, description and active; id and created_at are kept.
    async fn update(&self, model: category::Model) -> Result<category::Model, ServiceError>;
    /// Returns whether a row was removed.
    async fn remove(&self, id: i32) -> Result<bool, ServiceError>;
    async fn query_all(&self, window: Option<Window>) -> Result<Vec<category::Model>, ServiceError>;
    async fn query_where(&self, filter: CategoryFilter, window: Option<Window>) -> Result<Vec<category::Model>, ServiceError>;
    async fn count(&self, filter: Option<CategoryFilter>) -> Result<u64, ServiceError>;
}

/// Product storage. Reads join each product with its category; listings are
/// ordered by product name, then id.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert(&self, row: ProductInsert) -> Result<product::Model, ServiceError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<ProductDetail>, ServiceError>;
    /// Overwrite name, description, price, stock and category_id; id and created_at are kept.
    async fn update(&self, model: product::Model) -> Result<product::Model, ServiceError>;
    async fn remove(&self, id: i32) -> Result<bool, ServiceError>;
    async fn query_all(&self, window: Option<Window>) -> Result<Vec<ProductDetail>, ServiceError>;
    async fn query_where(&self, filter: ProductFilter, window: Option<Window>) -> Result<Vec<ProductDetail>, ServiceError>;
    async fn count(&self, filter: Option<ProductFilter>) -> Result<u64, ServiceError>;
}

/// Both repositories backed by the same store.
#[derive(Clone)]
pub struct Repositories {
    pub categories: Arc<dyn CategoryRepository>,
    pub products: Arc<dyn ProductRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryDatabase::new());
        Self { categories: store.clone(), products: store }
    }

    pub fn sea_orm(db: DatabaseConnection) -> Self {
        let store = Arc::new(seaorm::SeaOrmDatabase::new(db));
        Self { categories: store.clone(), products: store }
    }
}

/// Open the backend named in configuration. Postgres connections run pending
/// migrations first unless `run_migrations` is off.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<Repositories> {
    match cfg.backend {
        DatabaseBackend::Memory => {
            info!(backend = "memory", "using in-memory catalogue store");
            Ok(Repositories::in_memory())
        }
        DatabaseBackend::Postgres => {
            let db = models::db::connect_with_config(cfg).await?;
            if cfg.run_migrations {
                migration::Migrator::up(&db, None).await?;
                info!("migrations applied");
            }
            info!(backend = "postgres", "using relational catalogue store");
            Ok(Repositories::sea_orm(db))
        }
    }
}
