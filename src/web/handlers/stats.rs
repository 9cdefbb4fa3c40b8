use axum::{extract::State, response::Response};

use crate::errors::AppError;
use crate::models::CatalogStats;
use crate::web::{AppState, responses::{ApiResponse, handle_result}};

#[utoipa::path(
    get,
    path = "/api/v1/stats",
    tag = "stats",
    summary = "Catalog statistics",
    description = "Entity counts, endpoint status split and endpoint distribution per provider, stream and domain",
    responses((status = 200, description = "Statistics", body = ApiResponse<CatalogStats>))
)]
pub async fn get_stats(State(state): State<AppState>) -> Response {
    handle_result(state.stats.collect().await.map_err(AppError::from))
}
