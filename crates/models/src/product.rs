use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{category, errors, validation};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub price: Decimal,
    pub stock: i32,
    pub created_at: DateTimeWithTimeZone,
    pub category_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Category }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Category => Entity::belongs_to(category::Entity)
                .from(Column::CategoryId)
                .to(category::Column::Id)
                .into(),
        }
    }
}

impl Related<category::Entity> for Entity {
    fn to() -> RelationDef { Relation::Category.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// A product joined with its owning category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Model,
    pub category: Option<category::Model>,
}

impl ProductDetail {
    /// Case-insensitive match on name, description or category name.
    /// `needle` must already be lowercase.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        let hit = |s: &str| s.to_lowercase().contains(needle);
        hit(&self.product.name)
            || self.product.description.as_deref().is_some_and(hit)
            || self.category.as_ref().is_some_and(|c| hit(&c.name))
    }
}

/// Decimal places the `price` column keeps.
pub const PRICE_SCALE: u32 = 2;

/// Largest price stored and sent on the wire without rounding: 15 significant
/// digits survive the `f64` JSON encoding.
pub fn max_price() -> Decimal { Decimal::new(999_999_999_999_999, PRICE_SCALE) }

pub fn validate_price(price: Decimal) -> Result<(), errors::ModelError> {
    if price <= Decimal::ZERO {
        return Err(errors::ModelError::invalid("price", "must be greater than 0"));
    }
    if price.normalize().scale() > PRICE_SCALE {
        return Err(errors::ModelError::invalid("price", "must have at most 2 decimal places"));
    }
    if price > max_price() {
        return Err(errors::ModelError::invalid("price", format!("must not exceed {}", max_price())));
    }
    Ok(())
}

pub fn validate_stock(stock: i32) -> Result<(), errors::ModelError> {
    if stock < 0 {
        return Err(errors::ModelError::invalid("stock", "cannot be negative"));
    }
    Ok(())
}

/// Check the user-editable fields of a product.
pub fn validate(name: &str, description: Option<&str>, price: Decimal, stock: i32) -> Result<(), errors::ModelError> {
    validation::validate_name(name)?;
    validation::validate_description(description)?;
    validate_price(price)?;
    validate_stock(stock)
}
