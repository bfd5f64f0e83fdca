//! Product module: domain inputs and the service enforcing category existence
//! and per-category name uniqueness.

pub mod domain;
pub mod service;

pub use service::ProductService;
