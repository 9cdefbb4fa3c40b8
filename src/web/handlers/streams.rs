//! Stream HTTP handlers

use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};

use crate::models::{Stream, StreamRequest};
use crate::web::{
    AppState,
    responses::{ApiResponse, DeletedResponse, handle_created, handle_result},
};

#[utoipa::path(
    get,
    path = "/api/v1/streams",
    tag = "streams",
    summary = "List streams",
    responses((status = 200, description = "All streams ordered by id", body = ApiResponse<Vec<Stream>>))
)]
pub async fn list_streams(State(state): State<AppState>) -> Response {
    handle_result(state.catalog_service.list_streams().await)
}

#[utoipa::path(
    post,
    path = "/api/v1/streams",
    tag = "streams",
    summary = "Create stream",
    request_body = StreamRequest,
    responses(
        (status = 201, description = "Stream created", body = ApiResponse<Stream>),
        (status = 400, description = "Blank field"),
        (status = 404, description = "Scoping provider not found")
    )
)]
pub async fn create_stream(
    State(state): State<AppState>,
    Json(request): Json<StreamRequest>,
) -> Response {
    handle_created(state.catalog_service.create_stream(request).await)
}

#[utoipa::path(
    get,
    path = "/api/v1/streams/{id}",
    tag = "streams",
    summary = "Get stream",
    params(("id" = i32, Path, description = "Stream id")),
    responses(
        (status = 200, description = "Stream", body = ApiResponse<Stream>),
        (status = 404, description = "Stream not found")
    )
)]
pub async fn get_stream(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    handle_result(state.catalog_service.get_stream(id).await)
}

#[utoipa::path(
    put,
    path = "/api/v1/streams/{id}",
    tag = "streams",
    summary = "Update stream",
    params(("id" = i32, Path, description = "Stream id")),
    request_body = StreamRequest,
    responses(
        (status = 200, description = "Stream updated", body = ApiResponse<Stream>),
        (status = 404, description = "Stream not found"),
        (status = 400, description = "Blank field"),
        (status = 404, description = "Scoping provider not found")
    )
)]
pub async fn update_stream(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<StreamRequest>,
) -> Response {
    handle_result(state.catalog_service.update_stream(id, request).await)
}

#[utoipa::path(
    delete,
    path = "/api/v1/streams/{id}",
    tag = "streams",
    summary = "Delete stream",
    params(("id" = i32, Path, description = "Stream id")),
    responses(
        (status = 200, description = "Stream and its endpoints deleted", body = ApiResponse<DeletedResponse>),
        (status = 404, description = "Stream not found"),
    )
)]
pub async fn delete_stream(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    let result = state
        .catalog_service
        .delete_stream(id)
        .await
        .map(|()| DeletedResponse { id, deleted: true });
    handle_result(result)
}
