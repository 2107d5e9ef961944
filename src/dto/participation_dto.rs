use crate::models::answer::SubmittedAnswer;
use crate::models::participation::{Participation, ParticipationSummary};
use crate::models::result::QuizResult;
use crate::services::participation_service::Decision;
use crate::utils::time::format_hms;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct OrchestrateRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Stable external identity, digits only (e.g. a national ID).
    #[validate(length(min = 4, max = 20))]
    pub external_id: String,
    #[validate(range(min = 1))]
    pub group_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmittedAnswerPayload {
    #[validate(range(min = 1))]
    pub question_id: i32,
    #[validate(range(min = 1))]
    pub selected_option: i32,
}

impl From<SubmittedAnswerPayload> for SubmittedAnswer {
    fn from(payload: SubmittedAnswerPayload) -> Self {
        SubmittedAnswer {
            question_id: payload.question_id,
            selected_option: payload.selected_option,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct FinalizeRequest {
    #[validate(range(min = 1))]
    pub participation_id: i32,
    #[validate(nested)]
    pub answers: Vec<SubmittedAnswerPayload>,
    /// Total solving time as "HH:MM:SS", recorded verbatim.
    pub total_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateAnswersRequest {
    #[validate(nested)]
    pub answers: Vec<SubmittedAnswerPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrchestrateResponse {
    pub token: String,
    /// "start" | "continue" | "wait" | "exhausted"
    pub action: String,
    pub participation_id: i32,
    pub attempt_number: i32,
    #[schema(value_type = Object)]
    pub answers: JsonValue,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
    pub total_time: Option<String>,
    /// Cooldown still to elapse, only present for "wait".
    pub remaining_seconds: Option<i64>,
}

impl OrchestrateResponse {
    pub fn from_decision(token: String, decision: &Decision) -> Self {
        let participation = decision.participation();
        Self {
            token,
            action: decision.action().to_string(),
            participation_id: participation.id,
            attempt_number: participation.attempt_number,
            answers: participation.answers.clone(),
            started_at: participation.started_at,
            finished_at: participation.finished_at,
            total_time: participation.total_time_seconds.map(format_hms),
            remaining_seconds: decision.remaining().map(|d| d.num_seconds()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResultSummary {
    pub total_questions: i32,
    pub correct_count: i32,
    #[schema(value_type = String)]
    pub accuracy_percentage: rust_decimal::Decimal,
    pub total_time: String,
}

impl From<QuizResult> for ResultSummary {
    fn from(result: QuizResult) -> Self {
        Self {
            total_questions: result.total_questions,
            correct_count: result.correct_count,
            accuracy_percentage: result.accuracy_percentage,
            total_time: format_hms(result.total_time_seconds),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FinalizeResponse {
    pub participation_id: i32,
    pub state: String,
    pub result: ResultSummary,
}

impl FinalizeResponse {
    pub fn new(participation: &Participation, result: QuizResult) -> Self {
        Self {
            participation_id: participation.id,
            state: participation.state.clone(),
            result: ResultSummary::from(result),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipationOut {
    pub id: i32,
    pub group_id: i32,
    pub attempt_number: i32,
    pub state: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
    pub total_time: Option<String>,
    pub user_id: i32,
    pub user_name: String,
    pub user_external_id: String,
}

impl From<ParticipationSummary> for ParticipationOut {
    fn from(row: ParticipationSummary) -> Self {
        Self {
            id: row.id,
            group_id: row.group_id,
            attempt_number: row.attempt_number,
            state: row.state,
            started_at: row.started_at,
            finished_at: row.finished_at,
            total_time: row.total_time_seconds.map(format_hms),
            user_id: row.user_id,
            user_name: row.user_name,
            user_external_id: row.user_external_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListParticipationsResponse {
    pub participations: Vec<ParticipationOut>,
    pub total: usize,
}

impl ListParticipationsResponse {
    pub fn new(rows: Vec<ParticipationSummary>) -> Self {
        let participations: Vec<ParticipationOut> =
            rows.into_iter().map(ParticipationOut::from).collect();
        let total = participations.len();
        Self {
            participations,
            total,
        }
    }
}
