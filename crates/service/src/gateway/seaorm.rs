//! SeaORM-backed repository implementation.
//!
//! Products are always read through an explicit `LEFT JOIN` on their category.
//! Constraint violations raised by the schema are mapped onto the same
//! business errors the services produce, so a race that slips past the
//! in-process locks still surfaces as `DuplicateName` or `HasDependents`.

use async_trait::async_trait;
use models::{category, product::{self, ProductDetail}};
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr},
    ActiveModelTrait, ActiveValue::{NotSet, Set, Unchanged}, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, SqlErr,
};

use super::{CategoryFilter, CategoryInsert, CategoryRepository, ProductFilter, ProductInsert, ProductRepository};
use crate::errors::ServiceError;
use crate::pagination::Window;
use crate::search::contains_pattern;

pub struct SeaOrmDatabase {
    pub db: DatabaseConnection,
}

impl SeaOrmDatabase {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn db_err(e: DbErr) -> ServiceError { ServiceError::Db(e.to_string()) }

/// Map a unique-index violation to `DuplicateName`, anything else to `Db`.
fn unique_or_db(e: DbErr, what: &str) -> ServiceError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ServiceError::DuplicateName(format!("{what} already exists")),
        _ => db_err(e),
    }
}

fn like(term: &str) -> LikeExpr { LikeExpr::new(contains_pattern(term)).escape('\\') }

fn category_condition(filter: &CategoryFilter) -> Condition {
    match filter {
        CategoryFilter::NameEquals { name, exclude_id } => {
            let mut cond = Condition::all().add(category::Column::Name.eq(name.as_str()));
            if let Some(id) = exclude_id {
                cond = cond.add(category::Column::Id.ne(*id));
            }
            cond
        }
        CategoryFilter::Contains(term) => Condition::any()
            .add(Expr::col((category::Entity, category::Column::Name)).like(like(term)))
            .add(Expr::col((category::Entity, category::Column::Description)).like(like(term))),
    }
}

/// Conditions may reference `category` columns; queries using them join it.
fn product_condition(filter: &ProductFilter) -> Condition {
    match filter {
        ProductFilter::InCategory(category_id) => Condition::all().add(product::Column::CategoryId.eq(*category_id)),
        ProductFilter::NameInCategory { name, category_id, exclude_id } => {
            let mut cond = Condition::all()
                .add(product::Column::Name.eq(name.as_str()))
                .add(product::Column::CategoryId.eq(*category_id));
            if let Some(id) = exclude_id {
                cond = cond.add(product::Column::Id.ne(*id));
            }
            cond
        }
        ProductFilter::Search(needle) => {
            let lower = |col: Expr| Expr::expr(Func::lower(col));
            Condition::any()
                .add(lower(Expr::col((product::Entity, product::Column::Name))).like(like(needle)))
                .add(lower(Expr::col((product::Entity, product::Column::Description))).like(like(needle)))
                .add(lower(Expr::col((category::Entity, category::Column::Name))).like(like(needle)))
        }
    }
}

fn into_details(rows: Vec<(product::Model, Option<category::Model>)>) -> Vec<ProductDetail> {
    rows.into_iter().map(|(product, category)| ProductDetail { product, category }).collect()
}

impl SeaOrmDatabase {
    async fn categories(&self, cond: Option<Condition>, window: Option<Window>) -> Result<Vec<category::Model>, ServiceError> {
        let mut finder = category::Entity::find();
        if let Some(cond) = cond {
            finder = finder.filter(cond);
        }
        finder = finder.order_by_asc(category::Column::Name).order_by_asc(category::Column::Id);
        if let Some(w) = window {
            finder = finder.offset(w.offset).limit(w.limit);
        }
        finder.all(&self.db).await.map_err(db_err)
    }

    async fn product_details(&self, cond: Option<Condition>, window: Option<Window>) -> Result<Vec<ProductDetail>, ServiceError> {
        let mut finder = product::Entity::find().find_also_related(category::Entity);
        if let Some(cond) = cond {
            finder = finder.filter(cond);
        }
        finder = finder.order_by_asc(product::Column::Name).order_by_asc(product::Column::Id);
        if let Some(w) = window {
            finder = finder.offset(w.offset).limit(w.limit);
        }
        let rows = finder.all(&self.db).await.map_err(db_err)?;
        Ok(into_details(rows))
    }
}

#[async_trait]
impl CategoryRepository for SeaOrmDatabase {
    async fn insert(&self, row: CategoryInsert) -> Result<category::Model, ServiceError> {
        let am = category::ActiveModel {
            id: NotSet,
            name: Set(row.name.clone()),
            description: Set(row.description),
            created_at: Set(row.created_at),
            active: Set(row.active),
        };
        am.insert(&self.db).await.map_err(|e| unique_or_db(e, &format!("category '{}'", row.name)))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<category::Model>, ServiceError> {
        category::Entity::find_by_id(id).one(&self.db).await.map_err(db_err)
    }

    async fn update(&self, model: category::Model) -> Result<category::Model, ServiceError> {
        let name = model.name.clone();
        let am = category::ActiveModel {
            id: Unchanged(model.id),
            name: Set(model.name),
            description: Set(model.description),
            active: Set(model.active),
            created_at: NotSet,
        };
        am.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => ServiceError::not_found("category"),
            other => unique_or_db(other, &format!("category '{name}'")),
        })
    }

    async fn remove(&self, id: i32) -> Result<bool, ServiceError> {
        let res = category::Entity::delete_by_id(id).exec(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => ServiceError::HasDependents(id),
            _ => db_err(e),
        })?;
        Ok(res.rows_affected > 0)
    }

    async fn query_all(&self, window: Option<Window>) -> Result<Vec<category::Model>, ServiceError> {
        self.categories(None, window).await
    }

    async fn query_where(&self, filter: CategoryFilter, window: Option<Window>) -> Result<Vec<category::Model>, ServiceError> {
        self.categories(Some(category_condition(&filter)), window).await
    }

    async fn count(&self, filter: Option<CategoryFilter>) -> Result<u64, ServiceError> {
        let mut finder = category::Entity::find();
        if let Some(f) = &filter {
            finder = finder.filter(category_condition(f));
        }
        finder.count(&self.db).await.map_err(db_err)
    }
}

#[async_trait]
impl ProductRepository for SeaOrmDatabase {
    async fn insert(&self, row: ProductInsert) -> Result<product::Model, ServiceError> {
        let category_id = row.category_id;
        let what = format!("product '{}' in category {}", row.name, category_id);
        let am = product::ActiveModel {
            id: NotSet,
            name: Set(row.name),
            description: Set(row.description),
            price: Set(row.price),
            stock: Set(row.stock),
            created_at: Set(row.created_at),
            category_id: Set(category_id),
        };
        am.insert(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => ServiceError::InvalidCategory(category_id),
            _ => unique_or_db(e, &what),
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<ProductDetail>, ServiceError> {
        let found = product::Entity::find_by_id(id)
            .find_also_related(category::Entity)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(|(product, category)| ProductDetail { product, category }))
    }

    async fn update(&self, model: product::Model) -> Result<product::Model, ServiceError> {
        let category_id = model.category_id;
        let what = format!("product '{}' in category {}", model.name, category_id);
        let am = product::ActiveModel {
            id: Unchanged(model.id),
            name: Set(model.name),
            description: Set(model.description),
            price: Set(model.price),
            stock: Set(model.stock),
            category_id: Set(category_id),
            created_at: NotSet,
        };
        am.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => ServiceError::not_found("product"),
            other => match other.sql_err() {
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => ServiceError::InvalidCategory(category_id),
                _ => unique_or_db(other, &what),
            },
        })
    }

    async fn remove(&self, id: i32) -> Result<bool, ServiceError> {
        let res = product::Entity::delete_by_id(id).exec(&self.db).await.map_err(db_err)?;
        Ok(res.rows_affected > 0)
    }

    async fn query_all(&self, window: Option<Window>) -> Result<Vec<ProductDetail>, ServiceError> {
        self.product_details(None, window).await
    }

    async fn query_where(&self, filter: ProductFilter, window: Option<Window>) -> Result<Vec<ProductDetail>, ServiceError> {
        self.product_details(Some(product_condition(&filter)), window).await
    }

    async fn count(&self, filter: Option<ProductFilter>) -> Result<u64, ServiceError> {
        let mut finder = product::Entity::find().join(JoinType::LeftJoin, product::Relation::Category.def());
        if let Some(f) = &filter {
            finder = finder.filter(product_condition(f));
        }
        finder.count(&self.db).await.map_err(db_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::postgres_db;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn unique(prefix: &str) -> String {
        format!("{prefix}_{}", Utc::now().timestamp_nanos_opt().unwrap_or_default())
    }

    #[tokio::test]
    async fn category_and_product_roundtrip_on_postgres() -> Result<(), anyhow::Error> {
        let Some(db) = postgres_db().await? else { return Ok(()); };
        let store = SeaOrmDatabase::new(db);

        let cat_name = unique("svc_cat");
        let c = CategoryRepository::insert(&store, CategoryInsert {
            name: cat_name.clone(),
            description: Some("Svc test category".into()),
            active: true,
            created_at: Utc::now().into(),
        })
        .await?;
        let dup = CategoryRepository::insert(&store, CategoryInsert {
            name: cat_name.clone(),
            description: None,
            active: true,
            created_at: Utc::now().into(),
        })
        .await;
        assert!(matches!(dup, Err(ServiceError::DuplicateName(_))));

        let p = ProductRepository::insert(&store, ProductInsert {
            name: unique("svc_prod"),
            description: Some("50% OFF".into()),
            price: Decimal::new(1250, 2),
            stock: 4,
            category_id: c.id,
            created_at: Utc::now().into(),
        })
        .await?;

        let detail = ProductRepository::find_by_id(&store, p.id).await?.expect("product present");
        assert_eq!(detail.category.as_ref().map(|x| x.id), Some(c.id));
        assert_eq!(detail.product.price, Decimal::new(1250, 2));

        let by_category = ProductRepository::query_where(&store, ProductFilter::Search(cat_name.to_lowercase()), None).await?;
        assert!(by_category.iter().any(|d| d.product.id == p.id));
        let literal = ProductRepository::count(&store, Some(ProductFilter::Search("50% off".into()))).await?;
        assert!(literal >= 1);

        let blocked = CategoryRepository::remove(&store, c.id).await;
        assert!(matches!(blocked, Err(ServiceError::HasDependents(id)) if id == c.id));

        assert!(ProductRepository::remove(&store, p.id).await?);
        assert!(CategoryRepository::remove(&store, c.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn product_insert_with_unknown_category_is_rejected_on_postgres() -> Result<(), anyhow::Error> {
        let Some(db) = postgres_db().await? else { return Ok(()); };
        let store = SeaOrmDatabase::new(db);
        let res = ProductRepository::insert(&store, ProductInsert {
            name: unique("orphan"),
            description: None,
            price: Decimal::ONE,
            stock: 0,
            category_id: i32::MAX,
            created_at: Utc::now().into(),
        })
        .await;
        assert!(matches!(res, Err(ServiceError::InvalidCategory(id)) if id == i32::MAX));
        Ok(())
    }
}
