//! OpenAPI document; the `*Doc` schemas mirror the JSON the handlers emit.

use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(Serialize, ToSchema)]
pub struct ErrorDoc { pub error: String, pub detail: Option<String> }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDoc {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub active: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInputDoc {
    pub name: String,
    pub description: Option<String>,
    pub active: Option<bool>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDoc {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i32,
    pub created_at: String,
    pub category_id: i32,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailDoc {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i32,
    pub created_at: String,
    pub category_id: i32,
    pub category: Option<CategoryDoc>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductInputDoc {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i32,
    pub category_id: i32,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPageDoc {
    pub data: Vec<CategoryDoc>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub search_term: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPageDoc {
    pub data: Vec<ProductDetailDoc>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub search_term: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::categories::list,
        crate::routes::categories::search,
        crate::routes::categories::get,
        crate::routes::categories::create,
        crate::routes::categories::update,
        crate::routes::categories::delete,
        crate::routes::products::list,
        crate::routes::products::search,
        crate::routes::products::get,
        crate::routes::products::create,
        crate::routes::products::update,
        crate::routes::products::delete,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorDoc,
            CategoryDoc,
            CategoryInputDoc,
            ProductDoc,
            ProductDetailDoc,
            ProductInputDoc,
            CategoryPageDoc,
            ProductPageDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "categories"),
        (name = "products")
    )
)]
pub struct ApiDoc;
