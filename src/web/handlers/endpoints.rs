//! Endpoint HTTP handlers
//!
//! Thin wrappers around [`crate::services::EndpointService`] and the
//! regeneration controller.

use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{
    Endpoint, EndpointRequest, GenerationReport, TestResolutionResponse, UpdateStatusRequest,
};
use crate::web::{
    AppState,
    extractors::{EndpointListParams, EndpointQuery},
    responses::{ApiResponse, DeletedResponse, handle_created, handle_result},
};

/// Regeneration report plus the number of endpoints generated
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenerateResponse {
    pub count: usize,
    #[serde(flatten)]
    pub report: GenerationReport,
}

#[utoipa::path(
    post,
    path = "/api/v1/generate",
    tag = "endpoints",
    summary = "Regenerate all endpoints",
    description = "Recompute the complete endpoint set from the catalog in one transaction",
    responses(
        (status = 200, description = "Regeneration report", body = ApiResponse<GenerateResponse>),
        (status = 500, description = "Regeneration aborted")
    )
)]
pub async fn generate_endpoints(State(state): State<AppState>) -> Response {
    let result = state
        .regeneration
        .regenerate_all()
        .await
        .map(|report| GenerateResponse {
            count: report.generated,
            report,
        });
    handle_result(result)
}

#[utoipa::path(
    get,
    path = "/api/v1/endpoints",
    tag = "endpoints",
    summary = "List endpoints",
    params(EndpointListParams),
    responses(
        (status = 200, description = "Matching endpoints ordered by id", body = ApiResponse<Vec<Endpoint>>),
        (status = 400, description = "Invalid filter value")
    )
)]
pub async fn list_endpoints(
    State(state): State<AppState>,
    EndpointQuery(filter): EndpointQuery,
) -> Response {
    handle_result(state.endpoint_service.list(filter).await)
}

#[utoipa::path(
    post,
    path = "/api/v1/endpoints",
    tag = "endpoints",
    summary = "Create endpoint",
    description = "Create an endpoint by hand. The match rule is not enforced.",
    request_body = EndpointRequest,
    responses(
        (status = 201, description = "Endpoint created", body = ApiResponse<Endpoint>),
        (status = 400, description = "Invalid status"),
        (status = 404, description = "Referenced record not found"),
        (status = 409, description = "Combination already exists")
    )
)]
pub async fn create_endpoint(
    State(state): State<AppState>,
    Json(request): Json<EndpointRequest>,
) -> Response {
    handle_created(state.endpoint_service.create(request).await)
}

#[utoipa::path(
    get,
    path = "/api/v1/endpoints/{id}",
    tag = "endpoints",
    summary = "Get endpoint",
    params(("id" = i32, Path, description = "Endpoint id")),
    responses(
        (status = 200, description = "Endpoint", body = ApiResponse<Endpoint>),
        (status = 404, description = "Endpoint not found")
    )
)]
pub async fn get_endpoint(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    handle_result(state.endpoint_service.get(id).await)
}

#[utoipa::path(
    put,
    path = "/api/v1/endpoints/{id}",
    tag = "endpoints",
    summary = "Update endpoint",
    params(("id" = i32, Path, description = "Endpoint id")),
    request_body = EndpointRequest,
    responses(
        (status = 200, description = "Endpoint updated", body = ApiResponse<Endpoint>),
        (status = 400, description = "Invalid status"),
        (status = 404, description = "Endpoint or referenced record not found"),
        (status = 409, description = "Combination held by another endpoint")
    )
)]
pub async fn update_endpoint(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<EndpointRequest>,
) -> Response {
    handle_result(state.endpoint_service.update(id, request).await)
}

#[utoipa::path(
    delete,
    path = "/api/v1/endpoints/{id}",
    tag = "endpoints",
    summary = "Delete endpoint",
    params(("id" = i32, Path, description = "Endpoint id")),
    responses(
        (status = 200, description = "Endpoint deleted", body = ApiResponse<DeletedResponse>),
        (status = 404, description = "Endpoint not found")
    )
)]
pub async fn delete_endpoint(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    let result = state
        .endpoint_service
        .delete(id)
        .await
        .map(|()| DeletedResponse { id, deleted: true });
    handle_result(result)
}

#[utoipa::path(
    patch,
    path = "/api/v1/endpoints/{id}/status",
    tag = "endpoints",
    summary = "Enable or disable endpoint",
    params(("id" = i32, Path, description = "Endpoint id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<Endpoint>),
        (status = 400, description = "Status other than 0 or 1"),
        (status = 404, description = "Endpoint not found")
    )
)]
pub async fn update_endpoint_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateStatusRequest>,
) -> Response {
    handle_result(state.endpoint_service.set_status(id, request.status).await)
}

#[utoipa::path(
    post,
    path = "/api/v1/endpoints/{id}/test-resolution",
    tag = "endpoints",
    summary = "Probe endpoint resolution",
    description = "Read the live stream's AVC sequence header, classify the decoded width and persist the tier",
    params(("id" = i32, Path, description = "Endpoint id")),
    responses(
        (status = 200, description = "Detected tier", body = ApiResponse<TestResolutionResponse>),
        (status = 400, description = "URL cannot be probed"),
        (status = 404, description = "Endpoint not found"),
        (status = 502, description = "Stream unreachable or malformed"),
        (status = 504, description = "No sequence header before the probe timeout")
    )
)]
pub async fn test_endpoint_resolution(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Response {
    handle_result(state.endpoint_service.test_resolution(id).await)
}
