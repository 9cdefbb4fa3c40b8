//! Shared fixtures for the integration tests
//!
//! Every test gets its own in-memory SQLite database with the schema applied,
//! and seeds the catalog through the public HTTP API so that each write runs
//! the same regeneration pass production traffic does.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};

use stream_endpoint_manager::{
    config::{Config, RegenerationStrategy},
    database::Database,
    services::stream_prober::FlvPuller,
    web::{AppState, WebServer},
};

pub fn test_config(strategy: RegenerationStrategy) -> Config {
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();
    config.regeneration.strategy = strategy;
    config.probe.timeout = std::time::Duration::from_secs(2);
    config
}

pub async fn test_database(config: &Config) -> Database {
    let database = Database::new(&config.database)
        .await
        .expect("Failed to create test database");
    database.migrate().await.expect("Failed to run migrations");
    database
}

pub async fn test_state(strategy: RegenerationStrategy) -> AppState {
    let config = test_config(strategy);
    let database = test_database(&config).await;
    AppState::new(config, database).expect("Failed to create app state")
}

pub async fn test_state_with_puller(puller: Arc<dyn FlvPuller>) -> AppState {
    let config = test_config(RegenerationStrategy::Reconcile);
    let database = test_database(&config).await;
    AppState::with_puller(config, database, puller)
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(WebServer::create_router(state)).expect("Failed to start test server")
}

/// POST `body` and return the `data` member of the envelope, asserting 201
pub async fn create(server: &TestServer, path: &str, body: Value) -> Value {
    let response = server.post(path).json(&body).await;
    assert_eq!(
        response.status_code(),
        StatusCode::CREATED,
        "POST {path} failed: {}",
        response.text()
    );
    response.json::<Value>()["data"].clone()
}

pub fn id_of(record: &Value) -> i64 {
    record["id"].as_i64().expect("record without id")
}

pub async fn list(server: &TestServer, path: &str) -> Vec<Value> {
    let response = server.get(path).await;
    assert_eq!(response.status_code(), StatusCode::OK, "GET {path} failed: {}", response.text());
    response.json::<Value>()["data"]
        .as_array()
        .cloned()
        .expect("list response without array data")
}

/// Ids of the records seeded by [`seed_catalog`]
#[derive(Debug, Clone, Copy)]
pub struct Seeded {
    pub provider: i64,
    pub line: i64,
    pub domain: i64,
    pub stream: i64,
    pub stream_path: i64,
}

/// One provider with one `live` line, one domain, one unscoped `live` stream
/// and one stream path: exactly one endpoint,
/// `https://line1.example.com/table7/video.flv`.
pub async fn seed_catalog(server: &TestServer) -> Seeded {
    let provider = create(
        server,
        "/api/v1/providers",
        json!({"name": "Acme CDN", "code": "acme"}),
    )
    .await;
    let line = create(
        server,
        "/api/v1/lines",
        json!({
            "provider_id": id_of(&provider),
            "name": "Primary",
            "code": "live",
            "display_name": "line1",
        }),
    )
    .await;
    let domain = create(server, "/api/v1/domains", json!({"name": "example.com"})).await;
    let stream = create(
        server,
        "/api/v1/streams",
        json!({"name": "News", "code": "live"}),
    )
    .await;
    let stream_path = create(
        server,
        "/api/v1/stream-paths",
        json!({
            "stream_id": id_of(&stream),
            "table_id": "table7",
            "full_path": "table7/video",
        }),
    )
    .await;

    Seeded {
        provider: id_of(&provider),
        line: id_of(&line),
        domain: id_of(&domain),
        stream: id_of(&stream),
        stream_path: id_of(&stream_path),
    }
}

/// Baseline 1280x720 (crop bottom 8)
pub const SPS_1280X720: &[u8] = &[0x67, 0x42, 0xc0, 0x1f, 0xf4, 0x02, 0x80, 0x2d, 0xc8];
/// Baseline 720x576
pub const SPS_720X576: &[u8] = &[0x67, 0x42, 0xc0, 0x1f, 0xf4, 0x05, 0xa0, 0x93, 0x20];

pub fn flv_header() -> Vec<u8> {
    vec![b'F', b'L', b'V', 0x01, 0x05, 0x00, 0x00, 0x00, 0x09, 0x00, 0x00, 0x00, 0x00]
}

fn flv_tag(tag_type: u8, timestamp: u32, data: &[u8]) -> Vec<u8> {
    let size = data.len() as u32;
    let mut tag = vec![tag_type];
    tag.extend_from_slice(&size.to_be_bytes()[1..]);
    tag.extend_from_slice(&timestamp.to_be_bytes()[1..]);
    tag.push((timestamp >> 24) as u8);
    tag.extend_from_slice(&[0, 0, 0]);
    tag.extend_from_slice(data);
    tag.extend_from_slice(&(size + 11).to_be_bytes());
    tag
}

/// A short live FLV stream: one AVC sequence header carrying `sps`, then a key frame
pub fn flv_stream(sps: &[u8]) -> Vec<u8> {
    let pps: &[u8] = &[0x68, 0xce, 0x38, 0x80];
    let mut record = vec![1, sps[1], sps[2], sps[3], 0xff, 0xe1];
    record.extend_from_slice(&(sps.len() as u16).to_be_bytes());
    record.extend_from_slice(sps);
    record.push(1);
    record.extend_from_slice(&(pps.len() as u16).to_be_bytes());
    record.extend_from_slice(pps);

    let mut sequence_header = vec![0x17, 0x00, 0x00, 0x00, 0x00];
    sequence_header.extend(record);

    let mut stream = flv_header();
    stream.extend(flv_tag(9, 0, &sequence_header));
    stream.extend(flv_tag(
        9,
        40,
        &[0x17, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x65],
    ));
    stream
}
