use std::sync::Arc;

use crate::category::CategoryService;
use crate::gateway::Repositories;
use crate::locks::KeyedLocks;
use crate::product::ProductService;

/// Both services over one set of repositories, sharing a single lock table.
#[derive(Clone)]
pub struct Catalog {
    pub categories: Arc<CategoryService>,
    pub products: Arc<ProductService>,
}

impl Catalog {
    pub fn new(repos: Repositories) -> Self {
        let locks = Arc::new(KeyedLocks::new());
        let categories = CategoryService::new(repos.categories.clone(), repos.products.clone(), locks.clone());
        let products = ProductService::new(repos.products, repos.categories, locks);
        Self { categories: Arc::new(categories), products: Arc::new(products) }
    }
}
