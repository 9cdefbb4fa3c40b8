//! Provider HTTP handlers
//!
//! Deleting a provider also deletes its lines and their endpoints; it is
//! refused while streams are still scoped to the provider.

use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};

use crate::models::{Provider, ProviderRequest};
use crate::web::{
    AppState,
    responses::{ApiResponse, DeletedResponse, handle_created, handle_result},
};

#[utoipa::path(
    get,
    path = "/api/v1/providers",
    tag = "providers",
    summary = "List providers",
    responses((status = 200, description = "All providers ordered by id", body = ApiResponse<Vec<Provider>>))
)]
pub async fn list_providers(State(state): State<AppState>) -> Response {
    handle_result(state.catalog_service.list_providers().await)
}

#[utoipa::path(
    post,
    path = "/api/v1/providers",
    tag = "providers",
    summary = "Create provider",
    request_body = ProviderRequest,
    responses(
        (status = 201, description = "Provider created", body = ApiResponse<Provider>),
        (status = 400, description = "Blank field or invalid code"),
        (status = 409, description = "Code already in use")
    )
)]
pub async fn create_provider(
    State(state): State<AppState>,
    Json(request): Json<ProviderRequest>,
) -> Response {
    handle_created(state.catalog_service.create_provider(request).await)
}

#[utoipa::path(
    get,
    path = "/api/v1/providers/{id}",
    tag = "providers",
    summary = "Get provider",
    params(("id" = i32, Path, description = "Provider id")),
    responses(
        (status = 200, description = "Provider", body = ApiResponse<Provider>),
        (status = 404, description = "Provider not found")
    )
)]
pub async fn get_provider(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    handle_result(state.catalog_service.get_provider(id).await)
}

#[utoipa::path(
    put,
    path = "/api/v1/providers/{id}",
    tag = "providers",
    summary = "Update provider",
    params(("id" = i32, Path, description = "Provider id")),
    request_body = ProviderRequest,
    responses(
        (status = 200, description = "Provider updated", body = ApiResponse<Provider>),
        (status = 404, description = "Provider not found"),
        (status = 400, description = "Blank field or invalid code"),
        (status = 409, description = "Code already in use")
    )
)]
pub async fn update_provider(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<ProviderRequest>,
) -> Response {
    handle_result(state.catalog_service.update_provider(id, request).await)
}

#[utoipa::path(
    delete,
    path = "/api/v1/providers/{id}",
    tag = "providers",
    summary = "Delete provider",
    params(("id" = i32, Path, description = "Provider id")),
    responses(
        (status = 200, description = "Provider and its endpoints deleted", body = ApiResponse<DeletedResponse>),
        (status = 404, description = "Provider not found"),
        (status = 409, description = "Streams are still scoped to this provider")
    )
)]
pub async fn delete_provider(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    let result = state
        .catalog_service
        .delete_provider(id)
        .await
        .map(|()| DeletedResponse { id, deleted: true });
    handle_result(result)
}
