//! Stream path HTTP handlers

use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};

use crate::models::{StreamPath, StreamPathRequest};
use crate::web::{
    AppState,
    responses::{ApiResponse, DeletedResponse, handle_created, handle_result},
};

#[utoipa::path(
    get,
    path = "/api/v1/stream-paths",
    tag = "stream-paths",
    summary = "List stream paths",
    responses((status = 200, description = "All stream paths ordered by id", body = ApiResponse<Vec<StreamPath>>))
)]
pub async fn list_stream_paths(State(state): State<AppState>) -> Response {
    handle_result(state.catalog_service.list_stream_paths().await)
}

#[utoipa::path(
    post,
    path = "/api/v1/stream-paths",
    tag = "stream-paths",
    summary = "Create stream path",
    request_body = StreamPathRequest,
    responses(
        (status = 201, description = "Stream path created", body = ApiResponse<StreamPath>),
        (status = 400, description = "Blank field"),
        (status = 404, description = "Stream not found"),
        (status = 409, description = "table_id already in use")
    )
)]
pub async fn create_stream_path(
    State(state): State<AppState>,
    Json(request): Json<StreamPathRequest>,
) -> Response {
    handle_created(state.catalog_service.create_stream_path(request).await)
}

#[utoipa::path(
    get,
    path = "/api/v1/stream-paths/{id}",
    tag = "stream-paths",
    summary = "Get stream path",
    params(("id" = i32, Path, description = "Stream path id")),
    responses(
        (status = 200, description = "Stream path", body = ApiResponse<StreamPath>),
        (status = 404, description = "Stream path not found")
    )
)]
pub async fn get_stream_path(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    handle_result(state.catalog_service.get_stream_path(id).await)
}

#[utoipa::path(
    put,
    path = "/api/v1/stream-paths/{id}",
    tag = "stream-paths",
    summary = "Update stream path",
    params(("id" = i32, Path, description = "Stream path id")),
    request_body = StreamPathRequest,
    responses(
        (status = 200, description = "Stream path updated", body = ApiResponse<StreamPath>),
        (status = 404, description = "Stream path not found"),
        (status = 400, description = "Blank field"),
        (status = 404, description = "Stream not found"),
        (status = 409, description = "table_id already in use")
    )
)]
pub async fn update_stream_path(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<StreamPathRequest>,
) -> Response {
    handle_result(state.catalog_service.update_stream_path(id, request).await)
}

#[utoipa::path(
    delete,
    path = "/api/v1/stream-paths/{id}",
    tag = "stream-paths",
    summary = "Delete stream path",
    params(("id" = i32, Path, description = "Stream path id")),
    responses(
        (status = 200, description = "Stream path and its endpoints deleted", body = ApiResponse<DeletedResponse>),
        (status = 404, description = "Stream path not found"),
    )
)]
pub async fn delete_stream_path(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    let result = state
        .catalog_service
        .delete_stream_path(id)
        .await
        .map(|()| DeletedResponse { id, deleted: true });
    handle_result(result)
}
