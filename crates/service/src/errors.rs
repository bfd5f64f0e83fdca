use models::errors::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("duplicate name: {0}")]
    DuplicateName(String),
    #[error("category {0} does not exist")]
    InvalidCategory(i32),
    #[error("category {0} cannot be deleted because it still has products")]
    HasDependents(i32),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// Business-rule and input failures the caller can fix, as opposed to storage faults.
    pub fn is_client_error(&self) -> bool {
        match self {
            ServiceError::DuplicateName(_)
            | ServiceError::InvalidCategory(_)
            | ServiceError::HasDependents(_)
            | ServiceError::NotFound(_)
            | ServiceError::Model(ModelError::Validation { .. }) => true,
            ServiceError::Db(_) | ServiceError::Model(ModelError::Db(_)) => false,
        }
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self { ServiceError::Db(e.to_string()) }
}
