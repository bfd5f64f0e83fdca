//! Demo catalogue loaded on startup.

use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use crate::catalog::Catalog;
use crate::category::domain::NewCategory;
use crate::errors::ServiceError;
use crate::product::domain::NewProduct;

const CATEGORIES: [(&str, &str); 3] = [
    ("Electrónica", "Dispositivos electrónicos"),
    ("Hogar", "Artículos para el hogar"),
    ("Congelados", "Artículos frescos y congelados"),
];

// (name, description, price in cents, stock, category name)
const PRODUCTS: [(&str, &str, i64, i32, &str); 3] = [
    ("Smartphone", "Teléfono avanzado", 59999, 50, "Electrónica"),
    ("Sofá", "Sofá de 3 plazas", 29999, 10, "Hogar"),
    ("Helado", "Helado Crufi Triple 1kg", 55000, 40, "Congelados"),
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub categories_created: usize,
    pub products_created: usize,
}

/// Insert the demo categories when there are none, then the demo products
/// when there are none. Products whose category is missing are skipped.
#[instrument(skip(catalog))]
pub async fn seed_demo_data(catalog: &Catalog) -> Result<SeedReport, ServiceError> {
    let mut report = SeedReport::default();

    if catalog.categories.count().await? == 0 {
        for (name, description) in CATEGORIES {
            catalog.categories.create(NewCategory::new(name, Some(description))).await?;
            report.categories_created += 1;
        }
    }

    if catalog.products.count().await? == 0 {
        for (name, description, cents, stock, category_name) in PRODUCTS {
            let Some(category) = catalog.categories.get_by_name(category_name).await? else {
                warn!(product = name, category = category_name, "seed category missing, skipping product");
                continue;
            };
            catalog
                .products
                .create(NewProduct {
                    name: name.into(),
                    description: Some(description.into()),
                    price: Decimal::new(cents, 2),
                    stock,
                    category_id: category.id,
                })
                .await?;
            report.products_created += 1;
        }
    }

    info!(
        categories_created = report.categories_created,
        products_created = report.products_created,
        categories_total = catalog.categories.count().await?,
        products_total = catalog.products.count().await?,
        "seed_finished"
    );
    Ok(report)
}
