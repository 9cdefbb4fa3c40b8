//! OpenAPI documentation generation using utoipa
//!
//! Served as JSON at `/api/openapi.json` and browsable through Swagger UI at
//! `/docs`.

use utoipa::OpenApi;

use crate::web::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stream Endpoint Manager API",
        description = "
Maintains the catalog of CDN video stream delivery endpoints.

Endpoints are derived from the base catalog (providers, lines, domains,
streams and stream paths). Every catalog mutation regenerates the derived set;
`POST /api/v1/generate` runs a pass on demand.
        ",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        handlers::health::health_check,
        handlers::endpoints::generate_endpoints,
        handlers::endpoints::list_endpoints,
        handlers::endpoints::create_endpoint,
        handlers::endpoints::get_endpoint,
        handlers::endpoints::update_endpoint,
        handlers::endpoints::delete_endpoint,
        handlers::endpoints::update_endpoint_status,
        handlers::endpoints::test_endpoint_resolution,
        handlers::providers::list_providers,
        handlers::providers::create_provider,
        handlers::providers::get_provider,
        handlers::providers::update_provider,
        handlers::providers::delete_provider,
        handlers::lines::list_lines,
        handlers::lines::create_line,
        handlers::lines::get_line,
        handlers::lines::update_line,
        handlers::lines::delete_line,
        handlers::domains::list_domains,
        handlers::domains::create_domain,
        handlers::domains::get_domain,
        handlers::domains::update_domain,
        handlers::domains::delete_domain,
        handlers::streams::list_streams,
        handlers::streams::create_stream,
        handlers::streams::get_stream,
        handlers::streams::update_stream,
        handlers::streams::delete_stream,
        handlers::stream_paths::list_stream_paths,
        handlers::stream_paths::create_stream_path,
        handlers::stream_paths::get_stream_path,
        handlers::stream_paths::update_stream_path,
        handlers::stream_paths::delete_stream_path,
        handlers::stats::get_stats,
    ),
    components(
        schemas(
            crate::models::Endpoint,
            crate::models::EndpointRequest,
            crate::models::UpdateStatusRequest,
            crate::models::Resolution,
            crate::models::GenerationReport,
            crate::models::GenerationFailure,
            crate::models::ClassificationMethod,
            crate::models::TestResolutionResponse,
            crate::models::Provider,
            crate::models::ProviderRequest,
            crate::models::Line,
            crate::models::LineRequest,
            crate::models::Domain,
            crate::models::DomainRequest,
            crate::models::Stream,
            crate::models::StreamRequest,
            crate::models::StreamPath,
            crate::models::StreamPathRequest,
            crate::models::CatalogStats,
            crate::models::GroupCount,
            crate::web::handlers::endpoints::GenerateResponse,
            crate::web::responses::DeletedResponse,
            crate::web::responses::HealthResponse,
        )
    ),
    tags(
        (name = "endpoints", description = "Derived delivery endpoints, regeneration and resolution probing"),
        (name = "providers", description = "CDN providers"),
        (name = "lines", description = "Provider delivery lines"),
        (name = "domains", description = "Delivery domains"),
        (name = "streams", description = "Logical streams"),
        (name = "stream-paths", description = "Path fragments of a stream"),
        (name = "stats", description = "Catalog statistics"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;
