use std::sync::Arc;

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use shared::domain::{SortDirection, SortSpec};
use tokio::{net::TcpListener, sync::Mutex};

use super::*;

#[derive(Clone, Default)]
struct ServerState {
    queries: Arc<Mutex<Vec<PageQuery>>>,
    uploads: Arc<Mutex<Vec<(String, String, usize)>>>,
}

async fn handle_products(
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Json<serde_json::Value> {
    state.queries.lock().await.push(query.clone());
    Json(json!({
        "content": [{
            "id": 1,
            "sku": "SKU-1",
            "name": "Drill",
            "category": "Tools",
            "purchaseDate": "2024-02-10",
            "unitPrice": 89.9,
            "quantity": 4,
            "stockAgeDays": 12
        }],
        "page": {
            "size": query.size,
            "number": query.page,
            "totalElements": 31,
            "totalPages": 4
        }
    }))
}

async fn handle_summary_failure() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "aggregation failed")
}

async fn handle_import(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> (StatusCode, String) {
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map(|b| b.len()).unwrap_or_default();
        state.uploads.lock().await.push((name, filename.clone(), bytes));

        if filename.starts_with("bad") {
            return (
                StatusCode::BAD_REQUEST,
                r#"[{"row":2,"column":"sku","message":"required"}]"#.to_string(),
            );
        }
        if filename.starts_with("empty") {
            return (StatusCode::BAD_REQUEST, String::new());
        }
    }
    (StatusCode::OK, "Imported".to_string())
}

async fn spawn_inventory_server(state: ServerState) -> String {
    let app = Router::new()
        .route("/api/dashboard/products", get(handle_products))
        .route("/api/dashboard/summary", get(handle_summary_failure))
        .route("/api/import/excel", post(handle_import))
        .with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}/api/")
}

#[tokio::test]
async fn fetch_page_sends_paging_and_sort_parameters() {
    let state = ServerState::default();
    let base_url = spawn_inventory_server(state.clone()).await;
    let gateway = HttpInventoryGateway::new(base_url);
    assert!(gateway.base_url().ends_with("/api"));

    let query = PageQuery::new(2, 25, &SortSpec::new("unitPrice", SortDirection::Asc));
    let page = gateway.fetch_page(&query).await.expect("page");

    assert_eq!(page.total_elements(), 31);
    assert_eq!(page.content[0].stock_age_days, Some(12));
    let seen = state.queries.lock().await;
    assert_eq!(seen.as_slice(), &[query]);
}

#[tokio::test]
async fn summary_server_error_keeps_status_code() {
    let base_url = spawn_inventory_server(ServerState::default()).await;
    let gateway = HttpInventoryGateway::new(base_url);

    let err = gateway.fetch_summary().await.expect_err("summary should fail");
    assert!(matches!(err, GatewayError::Status(500)));
}

#[tokio::test]
async fn submit_file_posts_multipart_file_field() {
    let state = ServerState::default();
    let base_url = spawn_inventory_server(state.clone()).await;
    let gateway = HttpInventoryGateway::new(base_url);

    gateway
        .submit_file(SelectedFile::new("stock.xlsx", vec![1, 2, 3]))
        .await
        .expect("upload");

    let uploads = state.uploads.lock().await;
    assert_eq!(
        uploads.as_slice(),
        &[("file".to_string(), "stock.xlsx".to_string(), 3)]
    );
}

#[tokio::test]
async fn rejected_upload_keeps_status_and_text_body() {
    let base_url = spawn_inventory_server(ServerState::default()).await;
    let gateway = HttpInventoryGateway::new(base_url);

    let rejection = gateway
        .submit_file(SelectedFile::new("bad.xlsx", vec![0]))
        .await
        .expect_err("upload should be rejected");

    assert_eq!(rejection.status, Some(400));
    assert_eq!(
        rejection.body,
        ErrorBody::Text(r#"[{"row":2,"column":"sku","message":"required"}]"#.to_string())
    );
}

#[tokio::test]
async fn rejected_upload_with_empty_body_has_no_body() {
    let base_url = spawn_inventory_server(ServerState::default()).await;
    let gateway = HttpInventoryGateway::new(base_url);

    let rejection = gateway
        .submit_file(SelectedFile::new("empty.xlsx", vec![0]))
        .await
        .expect_err("upload should be rejected");

    assert_eq!(rejection, UploadRejection::new(Some(400), ErrorBody::Absent));
}

#[tokio::test]
async fn unreachable_server_rejects_upload_without_body() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let gateway = HttpInventoryGateway::new(format!("http://{addr}/api"));

    let rejection = gateway
        .submit_file(SelectedFile::new("stock.xlsx", vec![0]))
        .await
        .expect_err("upload should fail");

    assert_eq!(rejection, UploadRejection::transport());
}
