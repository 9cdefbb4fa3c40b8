//! Web layer module
//!
//! This module provides the HTTP interface of the endpoint manager. Handlers
//! are thin: they extract and validate input, call a service and render the
//! result in the standard [`responses::ApiResponse`] envelope.
//!
//! # Architecture
//!
//! - **Handlers**: HTTP request handlers organized by resource
//! - **Responses**: Response envelope and error to status mapping
//! - **Extractors**: Query string validation
//! - **Middleware**: Request logging
//! - **OpenAPI**: utoipa document served with Swagger UI

use anyhow::Result;
use axum::{
    Router,
    routing::{get, patch, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::info;
use utoipa::OpenApi;

use crate::{
    config::Config,
    database::{
        Database,
        repositories::{CatalogSeaOrmRepository, EndpointSeaOrmRepository, StatsSeaOrmRepository},
    },
    repositories::{BaseEntityStore, EndpointStore},
    services::{
        CatalogService, EndpointService, HttpFlvPuller, RegenerationController, StreamProber,
        stream_prober::FlvPuller,
    },
};

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod responses;

pub use responses::{ApiResponse, handle_error, handle_result};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub config: Config,
    pub catalog_service: Arc<CatalogService>,
    pub endpoint_service: Arc<EndpointService>,
    pub regeneration: Arc<RegenerationController>,
    pub stats: StatsSeaOrmRepository,
}

impl AppState {
    /// Wire repositories and services over `database`, probing over HTTP
    pub fn new(config: Config, database: Database) -> Result<Self> {
        let puller = HttpFlvPuller::new(&config.probe)?;
        Ok(Self::with_puller(config, database, Arc::new(puller)))
    }

    /// Same as [`AppState::new`] with a caller supplied stream source for probes
    pub fn with_puller(config: Config, database: Database, puller: Arc<dyn FlvPuller>) -> Self {
        let connection = database.connection();
        let catalog_repository = CatalogSeaOrmRepository::new(connection.clone());
        let catalog: Arc<dyn BaseEntityStore> = Arc::new(catalog_repository.clone());
        let endpoints: Arc<dyn EndpointStore> =
            Arc::new(EndpointSeaOrmRepository::new(connection.clone()));

        let regeneration = Arc::new(RegenerationController::new(
            catalog.clone(),
            endpoints.clone(),
            config.regeneration.strategy,
        ));
        let endpoint_service = Arc::new(EndpointService::new(
            catalog,
            endpoints,
            StreamProber::new(puller),
            config.probe.timeout,
        ));
        let catalog_service = Arc::new(CatalogService::new(
            catalog_repository,
            regeneration.clone(),
        ));

        Self {
            database,
            config,
            catalog_service,
            endpoint_service,
            regeneration,
            stats: StatsSeaOrmRepository::new(connection),
        }
    }
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(state: AppState) -> Result<Self> {
        let addr: SocketAddr = state.config.bind_address().parse()?;
        Ok(Self {
            app: Self::create_router(state),
            addr,
        })
    }

    /// Create the router with all routes and middleware
    pub fn create_router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(handlers::health::health_check))
            .nest("/api/v1", Self::api_v1_routes())
            .merge(Self::openapi_routes())
            .layer(CorsLayer::permissive())
            .layer(axum::middleware::from_fn(
                middleware::request_logging_middleware,
            ))
            .with_state(state)
    }

    fn openapi_routes() -> Router<AppState> {
        use utoipa_swagger_ui::SwaggerUi;

        Router::new()
            .merge(SwaggerUi::new("/docs").url("/api/openapi.json", openapi::ApiDoc::openapi()))
    }

    /// API v1 routes
    fn api_v1_routes() -> Router<AppState> {
        use handlers::{domains, endpoints, lines, providers, stats, stream_paths, streams};

        Router::new()
            // Endpoints
            .route("/generate", post(endpoints::generate_endpoints))
            .route("/endpoints/generate", post(endpoints::generate_endpoints))
            .route(
                "/endpoints",
                get(endpoints::list_endpoints).post(endpoints::create_endpoint),
            )
            .route(
                "/endpoints/{id}",
                get(endpoints::get_endpoint)
                    .put(endpoints::update_endpoint)
                    .delete(endpoints::delete_endpoint),
            )
            .route(
                "/endpoints/{id}/status",
                patch(endpoints::update_endpoint_status),
            )
            .route(
                "/endpoints/{id}/test-resolution",
                post(endpoints::test_endpoint_resolution),
            )
            // Catalog
            .route(
                "/providers",
                get(providers::list_providers).post(providers::create_provider),
            )
            .route(
                "/providers/{id}",
                get(providers::get_provider)
                    .put(providers::update_provider)
                    .delete(providers::delete_provider),
            )
            .route("/lines", get(lines::list_lines).post(lines::create_line))
            .route(
                "/lines/{id}",
                get(lines::get_line)
                    .put(lines::update_line)
                    .delete(lines::delete_line),
            )
            .route(
                "/domains",
                get(domains::list_domains).post(domains::create_domain),
            )
            .route(
                "/domains/{id}",
                get(domains::get_domain)
                    .put(domains::update_domain)
                    .delete(domains::delete_domain),
            )
            .route(
                "/streams",
                get(streams::list_streams).post(streams::create_stream),
            )
            .route(
                "/streams/{id}",
                get(streams::get_stream)
                    .put(streams::update_stream)
                    .delete(streams::delete_stream),
            )
            .route(
                "/stream-paths",
                get(stream_paths::list_stream_paths).post(stream_paths::create_stream_path),
            )
            .route(
                "/stream-paths/{id}",
                get(stream_paths::get_stream_path)
                    .put(stream_paths::update_stream_path)
                    .delete(stream_paths::delete_stream_path),
            )
            .route("/stats", get(stats::get_stats))
    }

    /// Serve until `cancellation` fires or, without a token, until SIGINT/SIGTERM
    pub async fn serve(self, cancellation: Option<CancellationToken>) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", self.addr, e))?;
        info!("Web server listening on http://{}", self.addr);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal(cancellation))
            .await?;
        info!("Web server stopped");
        Ok(())
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

async fn shutdown_signal(cancellation: Option<CancellationToken>) {
    if let Some(token) = cancellation {
        token.cancelled().await;
        info!("Web server received cancellation signal, shutting down gracefully");
        return;
    }

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down gracefully"),
                    _ = sigint.recv() => info!("Received SIGINT (Ctrl+C), shutting down gracefully"),
                }
            }
            _ => {
                tracing::warn!("Failed to install signal handlers, falling back to Ctrl+C");
                ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    ctrl_c().await;
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down gracefully"),
        // Without any signal source, run until the process is killed
        Err(e) => {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
