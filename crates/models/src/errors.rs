use thiserror::Error;

/// Failures raised by the entity layer: rejected field values and connection problems.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
}

impl ModelError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation { field, message: message.into() }
    }
}
