use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use server::routes::{build_router, AppState};
use service::{gateway::Repositories, Catalog};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

fn app() -> Router {
    let state = AppState::new(Catalog::new(Repositories::in_memory()));
    build_router(state, CorsLayer::very_permissive())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Option<String>, Value)> {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&v)?)
        }
        None => Body::empty(),
    };
    let res = app.clone().oneshot(req.body(body)?).await?;
    let status = res.status();
    let location = res.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()).map(str::to_string);
    let bytes = to_bytes(res.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, location, json))
}

async fn create_category(app: &Router, name: &str) -> anyhow::Result<i64> {
    let (status, _, body) = send(app, Method::POST, "/api/categories", Some(json!({ "name": name }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok(body["id"].as_i64().unwrap_or_default())
}

async fn create_product(app: &Router, name: &str, category_id: i64) -> anyhow::Result<(StatusCode, Value)> {
    let payload = json!({ "name": name, "price": 19.99, "stock": 5, "categoryId": category_id });
    let (status, _, body) = send(app, Method::POST, "/api/products", Some(payload)).await?;
    Ok((status, body))
}

#[tokio::test]
async fn health_reports_ok() -> anyhow::Result<()> {
    let (status, _, body) = send(&app(), Method::GET, "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
    Ok(())
}

#[tokio::test]
async fn category_create_returns_location_and_rejects_duplicates() -> anyhow::Result<()> {
    let app = app();
    let (status, location, body) =
        send(&app, Method::POST, "/api/categories", Some(json!({ "name": "Electronics", "description": "Gadgets" }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap_or_default();
    assert_eq!(location.as_deref(), Some(format!("/api/categories/{id}").as_str()));
    assert_eq!(body["active"], true);
    assert!(body.get("createdAt").is_some());

    let (status, _, body) = send(&app, Method::POST, "/api/categories", Some(json!({ "name": "Electronics" }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Duplicate Name");

    let (status, _, body) = send(&app, Method::GET, &format!("/api/categories/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Gadgets");
    Ok(())
}

#[tokio::test]
async fn category_update_checks_path_id_and_existence() -> anyhow::Result<()> {
    let app = app();
    let id = create_category(&app, "Home").await?;

    let mismatch = json!({ "id": id + 1, "name": "House" });
    let (status, _, _) = send(&app, Method::PUT, &format!("/api/categories/{id}"), Some(mismatch)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, body) =
        send(&app, Method::PUT, &format!("/api/categories/{id}"), Some(json!({ "name": "House", "active": false }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "House");
    assert_eq!(body["active"], false);

    let (status, _, body) = send(&app, Method::PUT, "/api/categories/999", Some(json!({ "name": "Ghost" }))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
    Ok(())
}

#[tokio::test]
async fn category_delete_is_blocked_by_products() -> anyhow::Result<()> {
    let app = app();
    let id = create_category(&app, "Electronics").await?;
    let (status, product) = create_product(&app, "Phone", id).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, body) = send(&app, Method::DELETE, &format!("/api/categories/{id}"), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Category In Use");

    let pid = product["id"].as_i64().unwrap_or_default();
    let (status, _, _) = send(&app, Method::DELETE, &format!("/api/products/{pid}"), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = send(&app, Method::DELETE, &format!("/api/categories/{id}"), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = send(&app, Method::DELETE, &format!("/api/categories/{id}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn product_rules_surface_as_bad_requests() -> anyhow::Result<()> {
    let app = app();
    let electronics = create_category(&app, "Electronics").await?;
    let home = create_category(&app, "Home").await?;

    assert_eq!(create_product(&app, "Phone", electronics).await?.0, StatusCode::CREATED);
    let (status, body) = create_product(&app, "Phone", electronics).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Duplicate Name");
    assert_eq!(create_product(&app, "Phone", home).await?.0, StatusCode::CREATED);

    let (status, body) = create_product(&app, "Orphan", 4242).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid Category");

    let bad_price = json!({ "name": "Free", "price": 0, "stock": 1, "categoryId": home });
    let (status, _, body) = send(&app, Method::POST, "/api/products", Some(bad_price)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");
    Ok(())
}

#[tokio::test]
async fn malformed_requests_use_the_error_body() -> anyhow::Result<()> {
    let app = app();
    let cid = create_category(&app, "Tools").await?;

    let (status, _, body) = send(&app, Method::POST, "/api/products", Some(json!({ "name": "Hammer" }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");
    assert!(body["detail"].as_str().is_some_and(|d| d.contains("price")));

    let wrong_type = json!({ "name": "Saw", "price": "cheap", "stock": 1, "categoryId": cid });
    let (status, _, body) = send(&app, Method::PUT, "/api/products/1", Some(wrong_type)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");

    let (status, _, body) = send(&app, Method::GET, "/api/categories/abc", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");

    let (status, _, _) = send(&app, Method::GET, "/api/products?pageNumber=first", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn sub_cent_price_is_rejected() -> anyhow::Result<()> {
    let app = app();
    let cid = create_category(&app, "Hardware").await?;
    let payload = json!({ "name": "Screw", "price": 0.001, "stock": 100, "categoryId": cid });
    let (status, _, body) = send(&app, Method::POST, "/api/products", Some(payload)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");
    Ok(())
}

#[tokio::test]
async fn product_detail_includes_category() -> anyhow::Result<()> {
    let app = app();
    let cid = create_category(&app, "Frozen").await?;
    let (_, created) = create_product(&app, "Ice cream", cid).await?;
    let pid = created["id"].as_i64().unwrap_or_default();

    let (status, _, body) = send(&app, Method::GET, &format!("/api/products/{pid}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categoryId"], cid);
    assert_eq!(body["category"]["name"], "Frozen");

    let (status, _, _) = send(&app, Method::GET, "/api/products/9999", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn product_update_moves_between_categories() -> anyhow::Result<()> {
    let app = app();
    let a = create_category(&app, "A").await?;
    let b = create_category(&app, "B").await?;
    let (_, created) = create_product(&app, "Widget", a).await?;
    let pid = created["id"].as_i64().unwrap_or_default();

    let moved = json!({ "name": "Widget", "price": 25.5, "stock": 0, "categoryId": b });
    let (status, _, body) = send(&app, Method::PUT, &format!("/api/products/{pid}"), Some(moved)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categoryId"], b);
    assert_eq!(body["stock"], 0);

    let lost = json!({ "name": "Widget", "price": 25.5, "stock": 0, "categoryId": 777 });
    let (status, _, _) = send(&app, Method::PUT, &format!("/api/products/{pid}"), Some(lost)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn listings_are_paged_and_searchable() -> anyhow::Result<()> {
    let app = app();
    let cid = create_category(&app, "Bulk").await?;
    for i in 1..=25 {
        assert_eq!(create_product(&app, &format!("Item {i:02}"), cid).await?.0, StatusCode::CREATED);
    }

    let (status, _, body) = send(&app, Method::GET, "/api/products?pageNumber=3&pageSize=10", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(5));
    assert_eq!(body["totalItems"], 25);
    assert_eq!(body["pageNumber"], 3);
    assert!(body.get("searchTerm").is_none());

    let (_, _, body) = send(&app, Method::GET, "/api/products?pageNumber=4&pageSize=10", None).await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));

    let (_, _, body) = send(&app, Method::GET, "/api/products", None).await?;
    assert_eq!(body["pageSize"], 15);

    let (status, _, body) = send(&app, Method::GET, "/api/products/search?term=BULK", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalItems"], 25);
    assert_eq!(body["searchTerm"], "BULK");

    let (status, _, _) = send(&app, Method::GET, "/api/products/search?term=%20%20", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _, _) = send(&app, Method::GET, "/api/categories/search", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, body) = send(&app, Method::GET, "/api/categories/search?term=Bu", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalItems"], 1);
    assert_eq!(body["pageSize"], 10);
    Ok(())
}

#[tokio::test]
async fn category_search_keeps_surrounding_spaces() -> anyhow::Result<()> {
    let app = app();
    create_category(&app, "Big Box").await?;
    create_category(&app, "Bulk").await?;

    let (status, _, body) = send(&app, Method::GET, "/api/categories/search?term=%20B", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalItems"], 1);
    assert_eq!(body["data"][0]["name"], "Big Box");
    assert_eq!(body["searchTerm"], " B");
    Ok(())
}

#[tokio::test]
async fn openapi_document_is_served() -> anyhow::Result<()> {
    let (status, _, body) = send(&app(), Method::GET, "/api-docs/openapi.json", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/api/products/{id}").is_some());
    Ok(())
}
