//! SeaORM entities for the catalogue plus the field rules shared by every
//! layer that accepts user input.

pub mod errors;
pub mod db;
pub mod validation;
pub mod category;
pub mod product;
