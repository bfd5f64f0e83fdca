pub mod errors;
pub mod openapi;
pub mod routes;
pub mod startup;

pub use startup::{load_config, serve, shutdown_signal};
