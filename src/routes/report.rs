use axum::{extract::State, response::IntoResponse, Json};

use crate::error::Result;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/reports/pending",
    responses(
        (status = 200, description = "Users with a pending participation")
    )
)]
#[axum::debug_handler]
pub async fn pending_users(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let rows = state.report_service.pending_users().await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/reports/finished",
    responses(
        (status = 200, description = "Users with a finalized participation")
    )
)]
#[axum::debug_handler]
pub async fn finished_users(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let rows = state.report_service.finished_users().await?;
    Ok(Json(rows))
}
