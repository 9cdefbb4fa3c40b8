//! Line HTTP handlers
//!
//! A line's `display_name` becomes the host label of its endpoint URLs, so
//! renaming it rewrites those URLs on the following regeneration.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};

use crate::models::{Line, LineRequest};
use crate::web::{
    AppState,
    extractors::LineListParams,
    responses::{ApiResponse, DeletedResponse, handle_created, handle_result},
};

#[utoipa::path(
    get,
    path = "/api/v1/lines",
    tag = "lines",
    summary = "List lines",
    params(LineListParams),
    responses((status = 200, description = "Lines ordered by id", body = ApiResponse<Vec<Line>>))
)]
pub async fn list_lines(
    State(state): State<AppState>,
    Query(params): Query<LineListParams>,
) -> Response {
    handle_result(state.catalog_service.list_lines(params.provider_id).await)
}

#[utoipa::path(
    post,
    path = "/api/v1/lines",
    tag = "lines",
    summary = "Create line",
    request_body = LineRequest,
    responses(
        (status = 201, description = "Line created", body = ApiResponse<Line>),
        (status = 400, description = "Blank field"),
        (status = 404, description = "Provider not found")
    )
)]
pub async fn create_line(
    State(state): State<AppState>,
    Json(request): Json<LineRequest>,
) -> Response {
    handle_created(state.catalog_service.create_line(request).await)
}

#[utoipa::path(
    get,
    path = "/api/v1/lines/{id}",
    tag = "lines",
    summary = "Get line",
    params(("id" = i32, Path, description = "Line id")),
    responses(
        (status = 200, description = "Line", body = ApiResponse<Line>),
        (status = 404, description = "Line not found")
    )
)]
pub async fn get_line(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    handle_result(state.catalog_service.get_line(id).await)
}

#[utoipa::path(
    put,
    path = "/api/v1/lines/{id}",
    tag = "lines",
    summary = "Update line",
    params(("id" = i32, Path, description = "Line id")),
    request_body = LineRequest,
    responses(
        (status = 200, description = "Line updated", body = ApiResponse<Line>),
        (status = 404, description = "Line not found"),
        (status = 400, description = "Blank field"),
        (status = 404, description = "Provider not found")
    )
)]
pub async fn update_line(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<LineRequest>,
) -> Response {
    handle_result(state.catalog_service.update_line(id, request).await)
}

#[utoipa::path(
    delete,
    path = "/api/v1/lines/{id}",
    tag = "lines",
    summary = "Delete line",
    params(("id" = i32, Path, description = "Line id")),
    responses(
        (status = 200, description = "Line and its endpoints deleted", body = ApiResponse<DeletedResponse>),
        (status = 404, description = "Line not found"),
    )
)]
pub async fn delete_line(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    let result = state
        .catalog_service
        .delete_line(id)
        .await
        .map(|()| DeletedResponse { id, deleted: true });
    handle_result(result)
}
