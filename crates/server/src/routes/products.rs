use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use models::product::{self, ProductDetail};
use serde::Deserialize;
use service::{
    pagination::PRODUCT_PAGE_SIZE,
    product::domain::{NewProduct, ProductChanges},
};
use rust_decimal::Decimal;
use tracing::info;

use super::{AppState, PageQuery, PagedResponse, SearchQuery};
use crate::errors::JsonApiError;

/// PUT body; `id` may be omitted but must match the path when present.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductInput {
    #[serde(default)]
    pub id: Option<i32>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub category_id: i32,
}

#[utoipa::path(
    get, path = "/api/products", tag = "products",
    params(PageQuery),
    responses((status = 200, description = "One page of products with their category", body = crate::openapi::ProductPageDoc))
)]
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<PagedResponse<ProductDetail>>, JsonApiError> {
    let Query(q) = query?;
    let page = state.catalog.products.list_page(q.pagination(PRODUCT_PAGE_SIZE)).await?;
    Ok(Json(PagedResponse::from_page(page, None)))
}

#[utoipa::path(
    get, path = "/api/products/search", tag = "products",
    params(SearchQuery),
    responses(
        (status = 200, description = "Products matching name, description or category name, ignoring case", body = crate::openapi::ProductPageDoc),
        (status = 400, description = "Missing search term", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<PagedResponse<ProductDetail>>, JsonApiError> {
    let Query(q) = query?;
    let term = q.term().ok_or_else(|| JsonApiError::bad_request("search term is required"))?;
    let page = state.catalog.products.search_page(term, q.pagination(PRODUCT_PAGE_SIZE)).await?;
    Ok(Json(PagedResponse::from_page(page, Some(term.to_string()))))
}

#[utoipa::path(
    get, path = "/api/products/{id}", tag = "products",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::ProductDetailDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<ProductDetail>, JsonApiError> {
    let Path(id) = path?;
    match state.catalog.products.get_by_id(id).await? {
        Some(p) => Ok(Json(p)),
        None => Err(JsonApiError::not_found(format!("product {id} not found"))),
    }
}

#[utoipa::path(
    post, path = "/api/products", tag = "products",
    request_body = crate::openapi::ProductInputDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::ProductDoc),
        (status = 400, description = "Validation Error, Duplicate Name or Invalid Category", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> Result<impl IntoResponse, JsonApiError> {
    let Json(input) = payload?;
    let created = state.catalog.products.create(input).await?;
    info!(product_id = created.id, category_id = created.category_id, "product created via api");
    let location = format!("/api/products/{}", created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)))
}

#[utoipa::path(
    put, path = "/api/products/{id}", tag = "products",
    params(("id" = i32, Path, description = "Product id")),
    request_body = crate::openapi::ProductInputDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::ProductDoc),
        (status = 400, description = "Validation Error, Duplicate Name or Invalid Category", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateProductInput>, JsonRejection>,
) -> Result<Json<product::Model>, JsonApiError> {
    let Path(id) = path?;
    let Json(input) = payload?;
    if input.id.is_some_and(|body_id| body_id != id) {
        return Err(JsonApiError::bad_request("id in body does not match the path"));
    }
    let changes = ProductChanges {
        id,
        name: input.name,
        description: input.description,
        price: input.price,
        stock: input.stock,
        category_id: input.category_id,
    };
    let updated = state.catalog.products.update(changes).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete, path = "/api/products/{id}", tag = "products",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, JsonApiError> {
    let Path(id) = path?;
    if !state.catalog.products.delete(id).await? {
        return Err(JsonApiError::not_found(format!("product {id} not found")));
    }
    info!(product_id = id, "product deleted via api");
    Ok(StatusCode::NO_CONTENT)
}
