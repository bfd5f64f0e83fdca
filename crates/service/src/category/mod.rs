//! Category module: domain inputs and the service enforcing name uniqueness
//! and the delete restriction.

pub mod domain;
pub mod service;

pub use service::CategoryService;
