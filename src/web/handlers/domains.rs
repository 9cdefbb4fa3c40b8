//! Domain HTTP handlers

use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};

use crate::models::{Domain, DomainRequest};
use crate::web::{
    AppState,
    responses::{ApiResponse, DeletedResponse, handle_created, handle_result},
};

#[utoipa::path(
    get,
    path = "/api/v1/domains",
    tag = "domains",
    summary = "List domains",
    responses((status = 200, description = "All domains ordered by id", body = ApiResponse<Vec<Domain>>))
)]
pub async fn list_domains(State(state): State<AppState>) -> Response {
    handle_result(state.catalog_service.list_domains().await)
}

#[utoipa::path(
    post,
    path = "/api/v1/domains",
    tag = "domains",
    summary = "Create domain",
    request_body = DomainRequest,
    responses(
        (status = 201, description = "Domain created", body = ApiResponse<Domain>),
        (status = 400, description = "Blank name"),
        (status = 409, description = "Name already in use")
    )
)]
pub async fn create_domain(
    State(state): State<AppState>,
    Json(request): Json<DomainRequest>,
) -> Response {
    handle_created(state.catalog_service.create_domain(request).await)
}

#[utoipa::path(
    get,
    path = "/api/v1/domains/{id}",
    tag = "domains",
    summary = "Get domain",
    params(("id" = i32, Path, description = "Domain id")),
    responses(
        (status = 200, description = "Domain", body = ApiResponse<Domain>),
        (status = 404, description = "Domain not found")
    )
)]
pub async fn get_domain(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    handle_result(state.catalog_service.get_domain(id).await)
}

#[utoipa::path(
    put,
    path = "/api/v1/domains/{id}",
    tag = "domains",
    summary = "Update domain",
    params(("id" = i32, Path, description = "Domain id")),
    request_body = DomainRequest,
    responses(
        (status = 200, description = "Domain updated", body = ApiResponse<Domain>),
        (status = 404, description = "Domain not found"),
        (status = 400, description = "Blank name"),
        (status = 409, description = "Name already in use")
    )
)]
pub async fn update_domain(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<DomainRequest>,
) -> Response {
    handle_result(state.catalog_service.update_domain(id, request).await)
}

#[utoipa::path(
    delete,
    path = "/api/v1/domains/{id}",
    tag = "domains",
    summary = "Delete domain",
    params(("id" = i32, Path, description = "Domain id")),
    responses(
        (status = 200, description = "Domain and its endpoints deleted", body = ApiResponse<DeletedResponse>),
        (status = 404, description = "Domain not found"),
    )
)]
pub async fn delete_domain(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    let result = state
        .catalog_service
        .delete_domain(id)
        .await
        .map(|()| DeletedResponse { id, deleted: true });
    handle_result(result)
}
