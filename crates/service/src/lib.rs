//! Service layer providing the catalogue's business operations on top of models.
//! - Separates business rules (uniqueness, delete restriction) from data access.
//! - Reuses validation and entity definitions in the `models` crate.
//! - Storage is reached only through the repository traits in [`gateway`].

pub mod catalog;
pub mod category;
pub mod errors;
pub mod gateway;
pub mod locks;
pub mod pagination;
pub mod product;
pub mod search;
pub mod seed;
#[cfg(test)]
pub mod test_support;

pub use catalog::Catalog;
pub use errors::ServiceError;
