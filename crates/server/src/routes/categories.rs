use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use models::category;
use serde::Deserialize;
use service::{
    category::domain::{CategoryChanges, NewCategory},
    pagination::CATEGORY_PAGE_SIZE,
};
use tracing::info;

use super::{AppState, PageQuery, PagedResponse, SearchQuery};
use crate::errors::JsonApiError;

/// PUT body; `id` may be omitted but must match the path when present.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryInput {
    #[serde(default)]
    pub id: Option<i32>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool { true }

#[utoipa::path(
    get, path = "/api/categories", tag = "categories",
    params(PageQuery),
    responses((status = 200, description = "One page of categories ordered by name", body = crate::openapi::CategoryPageDoc))
)]
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<PagedResponse<category::Model>>, JsonApiError> {
    let Query(q) = query?;
    let page = state.catalog.categories.list_page(q.pagination(CATEGORY_PAGE_SIZE)).await?;
    Ok(Json(PagedResponse::from_page(page, None)))
}

#[utoipa::path(
    get, path = "/api/categories/search", tag = "categories",
    params(SearchQuery),
    responses(
        (status = 200, description = "Categories whose name or description contains the term", body = crate::openapi::CategoryPageDoc),
        (status = 400, description = "Missing search term", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<PagedResponse<category::Model>>, JsonApiError> {
    let Query(q) = query?;
    let term = q.term().ok_or_else(|| JsonApiError::bad_request("search term is required"))?;
    let page = state.catalog.categories.search_page(term, q.pagination(CATEGORY_PAGE_SIZE)).await?;
    Ok(Json(PagedResponse::from_page(page, Some(term.to_string()))))
}

#[utoipa::path(
    get, path = "/api/categories/{id}", tag = "categories",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::CategoryDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<category::Model>, JsonApiError> {
    let Path(id) = path?;
    match state.catalog.categories.get_by_id(id).await? {
        Some(c) => Ok(Json(c)),
        None => Err(JsonApiError::not_found(format!("category {id} not found"))),
    }
}

#[utoipa::path(
    post, path = "/api/categories", tag = "categories",
    request_body = crate::openapi::CategoryInputDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::CategoryDoc),
        (status = 400, description = "Validation Error or Duplicate Name", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewCategory>, JsonRejection>,
) -> Result<impl IntoResponse, JsonApiError> {
    let Json(input) = payload?;
    let created = state.catalog.categories.create(input).await?;
    info!(category_id = created.id, "category created via api");
    let location = format!("/api/categories/{}", created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)))
}

#[utoipa::path(
    put, path = "/api/categories/{id}", tag = "categories",
    params(("id" = i32, Path, description = "Category id")),
    request_body = crate::openapi::CategoryInputDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::CategoryDoc),
        (status = 400, description = "Validation Error or Duplicate Name", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateCategoryInput>, JsonRejection>,
) -> Result<Json<category::Model>, JsonApiError> {
    let Path(id) = path?;
    let Json(input) = payload?;
    if input.id.is_some_and(|body_id| body_id != id) {
        return Err(JsonApiError::bad_request("id in body does not match the path"));
    }
    let changes = CategoryChanges { id, name: input.name, description: input.description, active: input.active };
    let updated = state.catalog.categories.update(changes).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete, path = "/api/categories/{id}", tag = "categories",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Category still has products", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, JsonApiError> {
    let Path(id) = path?;
    if !state.catalog.categories.exists(id).await? {
        return Err(JsonApiError::not_found(format!("category {id} not found")));
    }
    state.catalog.categories.delete(id).await?;
    info!(category_id = id, "category deleted via api");
    Ok(StatusCode::NO_CONTENT)
}
