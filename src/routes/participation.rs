use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::dto::participation_dto::{
    FinalizeRequest, FinalizeResponse, ListParticipationsResponse, OrchestrateRequest,
    OrchestrateResponse, ResultSummary, UpdateAnswersRequest,
};
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::answer::SubmittedAnswer;
use crate::utils::time::parse_hms;
use crate::utils::token::issue_session_token;
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/participations",
    request_body = OrchestrateRequest,
    responses(
        (status = 200, description = "Admission decided", body = OrchestrateResponse),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Group is closed or has not started yet"),
        (status = 404, description = "Group not found")
    )
)]
#[axum::debug_handler]
pub async fn orchestrate(
    State(state): State<AppState>,
    Json(req): Json<OrchestrateRequest>,
) -> Result<impl IntoResponse> {
    req.validate()?;
    if !req.external_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::BadRequest(
            "external_id must contain only digits".to_string(),
        ));
    }

    let name = req.name.trim();
    if name.is_empty() {
        return Err(Error::BadRequest("name must not be blank".to_string()));
    }

    let decision = state
        .participation_service
        .orchestrate(name, &req.external_id, req.group_id)
        .await?;

    let participation = decision.participation();
    let token = issue_session_token(&req.external_id, participation.id, participation.group_id)?;
    Ok(Json(OrchestrateResponse::from_decision(token, &decision)))
}

#[utoipa::path(
    put,
    path = "/api/participations/finalize",
    request_body = FinalizeRequest,
    responses(
        (status = 200, description = "Participation finalized and scored", body = FinalizeResponse),
        (status = 400, description = "Invalid payload or already finalized"),
        (status = 403, description = "Session does not match the participation"),
        (status = 404, description = "Participation not found")
    )
)]
#[axum::debug_handler]
pub async fn finalize(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<FinalizeRequest>,
) -> Result<impl IntoResponse> {
    req.validate()?;
    if claims.participation_id != req.participation_id {
        return Err(Error::Forbidden(
            "Not authorized to finalize this participation".to_string(),
        ));
    }

    let total_time_seconds = parse_hms(&req.total_time)
        .map_err(|e| Error::BadRequest(format!("Invalid total_time: {}", e)))?;
    let answers: Vec<SubmittedAnswer> = req.answers.into_iter().map(Into::into).collect();

    let (participation, result) = state
        .participation_service
        .finalize(req.participation_id, &answers, total_time_seconds)
        .await?;

    Ok(Json(FinalizeResponse::new(&participation, result)))
}

#[axum::debug_handler]
pub async fn update_answers(
    State(state): State<AppState>,
    Path(participation_id): Path<i32>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateAnswersRequest>,
) -> Result<impl IntoResponse> {
    req.validate()?;
    if claims.participation_id != participation_id {
        return Err(Error::Forbidden(
            "Not authorized to update this participation".to_string(),
        ));
    }

    let answers: Vec<SubmittedAnswer> = req.answers.into_iter().map(Into::into).collect();
    let updated = state
        .participation_service
        .update_answers(participation_id, &answers)
        .await?;

    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn get_participation(
    State(state): State<AppState>,
    Path(participation_id): Path<i32>,
) -> Result<impl IntoResponse> {
    let participation = state
        .participation_service
        .get_participation(participation_id)
        .await?;
    Ok(Json(participation))
}

#[axum::debug_handler]
pub async fn list_answer_records(
    State(state): State<AppState>,
    Path(participation_id): Path<i32>,
) -> Result<impl IntoResponse> {
    let records = state
        .participation_service
        .list_answer_records(participation_id)
        .await?;
    Ok(Json(records))
}

#[axum::debug_handler]
pub async fn get_result(
    State(state): State<AppState>,
    Path(participation_id): Path<i32>,
) -> Result<impl IntoResponse> {
    let result = state
        .participation_service
        .get_result(participation_id)
        .await?;
    Ok(Json(ResultSummary::from(result)))
}

#[axum::debug_handler]
pub async fn delete_participation(
    State(state): State<AppState>,
    Path(participation_id): Path<i32>,
) -> Result<impl IntoResponse> {
    state
        .participation_service
        .delete_participation(participation_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn list_all(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let rows = state.participation_service.list_all().await?;
    Ok(Json(ListParticipationsResponse::new(rows)))
}

#[derive(Debug, Deserialize)]
pub struct StateFilter {
    pub group_id: Option<i32>,
}

#[axum::debug_handler]
pub async fn list_by_state(
    State(state): State<AppState>,
    Path(participation_state): Path<String>,
    Query(filter): Query<StateFilter>,
) -> Result<impl IntoResponse> {
    let rows = state
        .participation_service
        .list_by_state(&participation_state, filter.group_id)
        .await?;
    Ok(Json(ListParticipationsResponse::new(rows)))
}

#[derive(Debug, Deserialize)]
pub struct SearchFilter {
    pub external_id: Option<String>,
    pub group_id: Option<i32>,
}

#[axum::debug_handler]
pub async fn search(
    State(state): State<AppState>,
    Query(filter): Query<SearchFilter>,
) -> Result<impl IntoResponse> {
    let rows = state
        .participation_service
        .search(filter.external_id.as_deref(), filter.group_id)
        .await?;
    Ok(Json(ListParticipationsResponse::new(rows)))
}

#[axum::debug_handler]
pub async fn list_by_group(
    State(state): State<AppState>,
    Path(group_id): Path<i32>,
) -> Result<impl IntoResponse> {
    let rows = state.participation_service.list_by_group(group_id).await?;
    Ok(Json(ListParticipationsResponse::new(rows)))
}
