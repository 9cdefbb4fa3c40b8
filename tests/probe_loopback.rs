//! Live stream probing over real HTTP
//!
//! A local axum server plays the CDN edge: it serves canned FLV bodies, a
//! stalled stream and a missing file. Endpoint URLs always point at the
//! public host, so the endpoint level tests route them to the loopback server
//! through a rewriting puller.

mod common;

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{Router, body::Body, http::StatusCode, routing::get};
use bytes::Bytes;
use serde_json::Value;
use url::Url;

use common::{
    SPS_720X576, SPS_1280X720, flv_header, flv_stream, id_of, list, seed_catalog, test_server,
    test_state_with_puller,
};
use stream_endpoint_manager::config::ProbeConfig;
use stream_endpoint_manager::models::Resolution;
use stream_endpoint_manager::services::stream_prober::{
    ChunkStream, FlvPuller, HttpFlvPuller, ProbeError, StreamProber,
};

async fn stalled_stream() -> Body {
    let header = futures::stream::once(async { Ok::<_, Infallible>(Bytes::from(flv_header())) });
    Body::from_stream(futures::StreamExt::chain(header, futures::stream::pending()))
}

/// Start the fake edge and return its address
async fn spawn_edge() -> SocketAddr {
    let app = Router::new()
        .route("/sd.flv", get(|| async { flv_stream(SPS_720X576) }))
        .route("/stalled.flv", get(stalled_stream))
        .route("/missing.flv", get(|| async { StatusCode::NOT_FOUND }))
        .fallback(|| async { flv_stream(SPS_1280X720) });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn http_prober() -> StreamProber {
    StreamProber::new(Arc::new(HttpFlvPuller::new(&ProbeConfig::default()).unwrap()))
}

#[tokio::test]
async fn decodes_width_from_a_live_http_stream() {
    let edge = spawn_edge().await;

    let outcome = http_prober()
        .probe(&format!("http://{edge}/live/main.flv"), Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(outcome.width, 1280);
    assert_eq!(outcome.height, 720);
    assert_eq!(outcome.resolution, Resolution::Uhd);

    let outcome = http_prober()
        .probe(&format!("http://{edge}/sd.flv"), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!((outcome.width, outcome.height), (720, 576));
    assert_eq!(outcome.resolution, Resolution::Sd);
}

#[tokio::test]
async fn error_status_is_a_connection_error() {
    let edge = spawn_edge().await;

    let result = http_prober()
        .probe(&format!("http://{edge}/missing.flv"), Duration::from_secs(5))
        .await;

    assert!(matches!(result, Err(ProbeError::Connection { .. })));
}

#[tokio::test]
async fn stalled_stream_times_out() {
    let edge = spawn_edge().await;

    let result = http_prober()
        .probe(&format!("http://{edge}/stalled.flv"), Duration::from_millis(300))
        .await;

    assert!(matches!(result, Err(ProbeError::Timeout { .. })));
}

#[tokio::test]
async fn refused_connection_is_reported() {
    // Bind and drop to get a port nobody listens on
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let result = http_prober()
        .probe(&format!("http://{addr}/live.flv"), Duration::from_secs(5))
        .await;

    assert!(matches!(result, Err(ProbeError::Connection { .. })));
}

/// Sends every request to the fake edge, keeping only the path
struct EdgePuller {
    edge: SocketAddr,
    inner: HttpFlvPuller,
    rewrite_path: Option<&'static str>,
}

impl EdgePuller {
    fn new(edge: SocketAddr) -> Self {
        Self {
            edge,
            inner: HttpFlvPuller::new(&ProbeConfig::default()).unwrap(),
            rewrite_path: None,
        }
    }

    fn serving(mut self, path: &'static str) -> Self {
        self.rewrite_path = Some(path);
        self
    }
}

#[async_trait]
impl FlvPuller for EdgePuller {
    async fn pull(&self, url: &Url) -> Result<ChunkStream, ProbeError> {
        let path = self.rewrite_path.unwrap_or(url.path());
        let local = Url::parse(&format!("http://{}{}", self.edge, path)).unwrap();
        self.inner.pull(&local).await
    }
}

#[tokio::test]
async fn test_resolution_persists_the_probed_tier() {
    let edge = spawn_edge().await;
    let server = test_server(test_state_with_puller(Arc::new(EdgePuller::new(edge))).await);
    seed_catalog(&server).await;
    let endpoint = list(&server, "/api/v1/endpoints").await.remove(0);
    assert_eq!(endpoint["resolution"], "SD");

    let response = server
        .post(&format!("/api/v1/endpoints/{}/test-resolution", id_of(&endpoint)))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let result = response.json::<Value>()["data"].clone();
    assert_eq!(result["resolution"], "UHD");
    assert_eq!(result["method"], "probe");
    assert!(result["message"].as_str().is_some_and(|m| m.contains("1280x720")));

    let stored = server
        .get(&format!("/api/v1/endpoints/{}", id_of(&endpoint)))
        .await
        .json::<Value>();
    assert_eq!(stored["data"]["resolution"], "UHD");
}

#[tokio::test]
async fn failed_probe_leaves_the_endpoint_untouched() {
    let edge = spawn_edge().await;
    let puller = EdgePuller::new(edge).serving("/missing.flv");
    let server = test_server(test_state_with_puller(Arc::new(puller)).await);
    seed_catalog(&server).await;
    let endpoint = list(&server, "/api/v1/endpoints").await.remove(0);

    let response = server
        .post(&format!("/api/v1/endpoints/{}/test-resolution", id_of(&endpoint)))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
    assert_eq!(response.json::<Value>()["success"], false);

    let stored = server
        .get(&format!("/api/v1/endpoints/{}", id_of(&endpoint)))
        .await
        .json::<Value>();
    assert_eq!(stored["data"]["resolution"], "SD");
    assert_eq!(stored["data"]["updated_at"], endpoint["updated_at"]);
}

#[tokio::test]
async fn stalled_probe_is_a_gateway_timeout() {
    let edge = spawn_edge().await;
    let puller = EdgePuller::new(edge).serving("/stalled.flv");
    let server = test_server(test_state_with_puller(Arc::new(puller)).await);
    seed_catalog(&server).await;
    let endpoint = list(&server, "/api/v1/endpoints").await.remove(0);

    let response = server
        .post(&format!("/api/v1/endpoints/{}/test-resolution", id_of(&endpoint)))
        .await;

    assert_eq!(response.status_code(), StatusCode::GATEWAY_TIMEOUT);
}
