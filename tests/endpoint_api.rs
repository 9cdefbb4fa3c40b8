//! Endpoint HTTP API
//!
//! Exercises validation, conflict detection and the list filters through the
//! router, asserting on status codes and the response envelope.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use rstest::rstest;
use serde_json::{Value, json};

use common::{Seeded, create, id_of, list, seed_catalog, test_server, test_state};
use stream_endpoint_manager::config::RegenerationStrategy;

async fn seeded_server() -> (TestServer, Seeded) {
    let server = test_server(test_state(RegenerationStrategy::Reconcile).await);
    let seeded = seed_catalog(&server).await;
    (server, seeded)
}

fn endpoint_body(seeded: &Seeded) -> Value {
    json!({
        "provider_id": seeded.provider,
        "line_id": seeded.line,
        "domain_id": seeded.domain,
        "stream_id": seeded.stream,
        "stream_path_id": seeded.stream_path,
    })
}

#[tokio::test]
async fn duplicate_combination_is_a_conflict() {
    let (server, seeded) = seeded_server().await;

    // The pass already generated this combination
    let response = server
        .post("/api/v1/endpoints")
        .json(&endpoint_body(&seeded))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let body = response.json::<Value>();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
    assert!(body.get("data").is_none_or(Value::is_null));
}

#[rstest]
#[case::two(2)]
#[case::negative(-1)]
#[tokio::test]
async fn status_outside_zero_and_one_is_rejected(#[case] status: i32) {
    let (server, _) = seeded_server().await;
    let endpoint = list(&server, "/api/v1/endpoints").await.remove(0);

    let response = server
        .patch(&format!("/api/v1/endpoints/{}/status", id_of(&endpoint)))
        .json(&json!({"status": status}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let unchanged = server
        .get(&format!("/api/v1/endpoints/{}", id_of(&endpoint)))
        .await
        .json::<Value>();
    assert_eq!(unchanged["data"]["status"], 1);
}

#[tokio::test]
async fn create_with_invalid_status_is_rejected() {
    let (server, seeded) = seeded_server().await;
    let mut body = endpoint_body(&seeded);
    body["status"] = json!(5);

    let response = server.post("/api/v1/endpoints").json(&body).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_with_unknown_reference_is_not_found() {
    let (server, seeded) = seeded_server().await;
    let mut body = endpoint_body(&seeded);
    body["domain_id"] = json!(999);

    let response = server.post("/api/v1/endpoints").json(&body).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_endpoint_is_not_found_everywhere() {
    let (server, seeded) = seeded_server().await;

    assert_eq!(
        server.get("/api/v1/endpoints/999").await.status_code(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        server.delete("/api/v1/endpoints/999").await.status_code(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        server
            .put("/api/v1/endpoints/999")
            .json(&endpoint_body(&seeded))
            .await
            .status_code(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        server
            .patch("/api/v1/endpoints/999/status")
            .json(&json!({"status": 0}))
            .await
            .status_code(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        server
            .post("/api/v1/endpoints/999/test-resolution")
            .await
            .status_code(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn update_recomputes_url_and_resolution() {
    let (server, seeded) = seeded_server().await;
    let endpoint = list(&server, "/api/v1/endpoints").await.remove(0);
    let uhd_path = create(
        &server,
        "/api/v1/stream-paths",
        json!({"stream_id": seeded.stream, "table_id": "table9", "full_path": "table9/4K"}),
    )
    .await;
    let vod_line = create(
        &server,
        "/api/v1/lines",
        json!({
            "provider_id": seeded.provider,
            "name": "On demand",
            "code": "vod",
            "display_name": "vod1",
        }),
    )
    .await;
    let url = format!("/api/v1/endpoints/{}", id_of(&endpoint));

    // Moving onto a combination the pass already generated conflicts
    let mut body = endpoint_body(&seeded);
    body["stream_path_id"] = json!(id_of(&uhd_path));
    let response = server.put(&url).json(&body).await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    // Re-saving its own combination does not
    body["stream_path_id"] = json!(seeded.stream_path);
    body["status"] = json!(0);
    let response = server.put(&url).json(&body).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["data"]["status"], 0);

    // A free combination gets a freshly rendered URL and tier
    body["line_id"] = json!(id_of(&vod_line));
    body["stream_path_id"] = json!(id_of(&uhd_path));
    body["status"] = json!(1);
    let response = server.put(&url).json(&body).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let updated = response.json::<Value>()["data"].clone();
    assert_eq!(updated["id"], endpoint["id"]);
    assert_eq!(updated["full_url"], "https://vod1.example.com/table9/4K.flv");
    assert_eq!(updated["resolution"], "UHD");
    assert_eq!(updated["status"], 1);
}

#[tokio::test]
async fn list_filters_combine() {
    let (server, seeded) = seeded_server().await;
    let second_domain = create(&server, "/api/v1/domains", json!({"name": "example.net"})).await;
    create(
        &server,
        "/api/v1/stream-paths",
        json!({"stream_id": seeded.stream, "table_id": "table8", "full_path": "table8/HD"}),
    )
    .await;
    assert_eq!(list(&server, "/api/v1/endpoints").await.len(), 4);

    let by_table = list(&server, "/api/v1/endpoints?table_id=table8").await;
    assert_eq!(by_table.len(), 2);
    assert!(by_table.iter().all(|e| e["resolution"] == "HD"));

    let by_domain = list(
        &server,
        &format!("/api/v1/endpoints?domain_id={}", id_of(&second_domain)),
    )
    .await;
    assert_eq!(by_domain.len(), 2);

    let combined = list(
        &server,
        &format!(
            "/api/v1/endpoints?table_id=table7&domain_id={}&provider_id={}",
            id_of(&second_domain),
            seeded.provider
        ),
    )
    .await;
    assert_eq!(combined.len(), 1);
    assert_eq!(
        combined[0]["full_url"],
        "https://line1.example.net/table7/video.flv"
    );

    let target = id_of(&combined[0]);
    server
        .patch(&format!("/api/v1/endpoints/{target}/status"))
        .json(&json!({"status": 0}))
        .await;
    let disabled = list(&server, "/api/v1/endpoints?status=0").await;
    assert_eq!(disabled.len(), 1);
    assert_eq!(id_of(&disabled[0]), target);
    assert_eq!(list(&server, "/api/v1/endpoints?status=1").await.len(), 3);

    // Results are ordered by id
    let ids: Vec<i64> = list(&server, "/api/v1/endpoints").await.iter().map(id_of).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
}

#[rstest]
#[case::status("status=7")]
#[case::resolution("resolution=8K")]
#[case::non_numeric_id("line_id=abc")]
#[tokio::test]
async fn invalid_filters_are_bad_requests(#[case] query: &str) {
    let (server, _) = seeded_server().await;

    let response = server.get(&format!("/api/v1/endpoints?{query}")).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["success"], false);
}

#[tokio::test]
async fn deleted_endpoint_is_gone_until_next_pass() {
    let (server, _) = seeded_server().await;
    let endpoint = list(&server, "/api/v1/endpoints").await.remove(0);

    let response = server
        .delete(&format!("/api/v1/endpoints/{}", id_of(&endpoint)))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["data"]["deleted"], true);
    assert!(list(&server, "/api/v1/endpoints").await.is_empty());

    server.post("/api/v1/generate").await;
    let regenerated = list(&server, "/api/v1/endpoints").await;
    assert_eq!(regenerated.len(), 1);
    assert_eq!(regenerated[0]["full_url"], endpoint["full_url"]);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (server, _) = seeded_server().await;

    let response = server.get("/api/openapi.json").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let document = response.json::<Value>();
    assert!(document["paths"]["/api/v1/endpoints/{id}/test-resolution"].is_object());
}
