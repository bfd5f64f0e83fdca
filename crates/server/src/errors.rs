use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

/// JSON error body `{"error": <title>, "detail": <message>}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: String,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: Option<String>) -> Self {
        Self { status, title: title.into(), detail }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(detail.into()))
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found", Some(detail.into()))
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let title = match &e {
            ServiceError::DuplicateName(_) => "Duplicate Name",
            ServiceError::InvalidCategory(_) => "Invalid Category",
            ServiceError::HasDependents(_) => "Category In Use",
            ServiceError::NotFound(_) => "Not Found",
            _ if e.is_client_error() => "Validation Error",
            _ => {
                error!(err = %e, "request failed on storage");
                let detail = Some("the request could not be completed".to_string());
                return Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Error", detail);
            }
        };
        let status = match &e {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, title, Some(e.to_string()))
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(e: JsonRejection) -> Self { Self::bad_request(e.body_text()) }
}

impl From<QueryRejection> for JsonApiError {
    fn from(e: QueryRejection) -> Self { Self::bad_request(e.body_text()) }
}

impl From<PathRejection> for JsonApiError {
    fn from(e: PathRejection) -> Self { Self::bad_request(e.body_text()) }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.title, "detail": self.detail });
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("cannot bind {addr}: {source}")]
    Bind { addr: String, source: std::io::Error },
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::errors::ModelError;

    #[test]
    fn business_errors_map_to_client_statuses() {
        let cases = [
            (ServiceError::DuplicateName("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::InvalidCategory(1), StatusCode::BAD_REQUEST),
            (ServiceError::HasDependents(1), StatusCode::BAD_REQUEST),
            (ServiceError::Model(ModelError::invalid("stock", "cannot be negative")), StatusCode::BAD_REQUEST),
            (ServiceError::not_found("category"), StatusCode::NOT_FOUND),
            (ServiceError::Db("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(JsonApiError::from(err).status, status);
        }
    }

    #[test]
    fn titles_name_the_rule() {
        assert_eq!(JsonApiError::from(ServiceError::HasDependents(3)).title, "Category In Use");
        assert_eq!(
            JsonApiError::from(ServiceError::Model(ModelError::invalid("name", "is required"))).title,
            "Validation Error"
        );
    }

    #[test]
    fn storage_faults_do_not_leak_their_cause() {
        let err = JsonApiError::from(ServiceError::Db("relation \"product\" does not exist".into()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.title, "Internal Error");
        assert!(err.detail.as_deref().is_some_and(|d| !d.contains("product")));
    }
}
