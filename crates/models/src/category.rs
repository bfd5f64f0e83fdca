use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{errors, product, validation};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Product }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Product => Entity::has_many(product::Entity).into(),
        }
    }
}

impl Related<product::Entity> for Entity {
    fn to() -> RelationDef { Relation::Product.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Check the user-editable fields of a category.
pub fn validate(name: &str, description: Option<&str>) -> Result<(), errors::ModelError> {
    validation::validate_name(name)?;
    validation::validate_description(description)
}

impl Model {
    /// Substring match on name or description, case-sensitive.
    pub fn matches(&self, term: &str) -> bool {
        self.name.contains(term)
            || self.description.as_deref().is_some_and(|d| d.contains(term))
    }
}
