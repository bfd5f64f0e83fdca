pub mod categories;
pub mod products;

use axum::{
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use service::{pagination::{Page, Pagination}, Catalog};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::openapi::ApiDoc;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
}

impl AppState {
    pub fn new(catalog: Catalog) -> Self { Self { catalog } }
}

/// `?pageNumber=&pageSize=`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageQuery {
    pub fn pagination(&self, default_page_size: u32) -> Pagination {
        Pagination::new(self.page_number, self.page_size, default_page_size)
    }
}

/// `?term=&pageNumber=&pageSize=`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    pub term: Option<String>,
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
}

impl SearchQuery {
    /// The term as sent, or `None` when missing or blank.
    pub fn term(&self) -> Option<&str> {
        self.term.as_deref().filter(|t| !t.trim().is_empty())
    }

    pub fn pagination(&self, default_page_size: u32) -> Pagination {
        Pagination::new(self.page_number, self.page_size, default_page_size)
    }
}

/// Listing envelope shared by the paged endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    pub data: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_items: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
}

impl<T> PagedResponse<T> {
    pub fn from_page(page: Page<T>, search_term: Option<String>) -> Self {
        Self {
            data: page.items,
            page_number: page.page_number,
            page_size: page.page_size,
            total_items: page.total_items,
            search_term,
        }
    }
}

#[utoipa::path(
    get, path = "/health", tag = "health",
    responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse))
)]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: health, the catalogue API and its OpenAPI document.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route("/api/categories", get(categories::list).post(categories::create))
        .route("/api/categories/search", get(categories::search))
        .route(
            "/api/categories/:id",
            get(categories::get).put(categories::update).delete(categories::delete),
        )
        .route("/api/products", get(products::list).post(products::create))
        .route("/api/products/search", get(products::search))
        .route(
            "/api/products/:id",
            get(products::get).put(products::update).delete(products::delete),
        )
        .with_state(state);

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_terms_are_missing_and_others_kept_verbatim() {
        let q = SearchQuery { term: Some("   ".into()), ..Default::default() };
        assert_eq!(q.term(), None);
        let q = SearchQuery { term: Some(" tv".into()), ..Default::default() };
        assert_eq!(q.term(), Some(" tv"));
    }

    #[test]
    fn envelope_omits_absent_search_term() {
        let page = Pagination::new(None, None, 10).page(vec![1, 2], 2);
        let json = serde_json::to_value(PagedResponse::from_page(page, None)).unwrap();
        assert_eq!(json["pageNumber"], 1);
        assert_eq!(json["pageSize"], 10);
        assert_eq!(json["totalItems"], 2);
        assert!(json.get("searchTerm").is_none());
    }
}
