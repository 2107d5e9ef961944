use crate::models::answer::SubmittedAnswer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

pub const STATE_PENDING: &str = "pending";
pub const STATE_FINALIZED: &str = "finalized";

/// One attempt of a user at a group's quiz. The pair
/// (user_id, group_id, attempt_number) is unique, and at most one
/// participation per (user, group) is pending at any time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Participation {
    pub id: i32,
    pub user_id: i32,
    pub group_id: i32,
    pub attempt_number: i32,
    pub state: String,
    pub answers: JsonValue,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub total_time_seconds: Option<i64>,
}

impl Participation {
    pub fn is_pending(&self) -> bool {
        self.state == STATE_PENDING
    }

    pub fn submitted_answers(&self) -> serde_json::Result<Vec<SubmittedAnswer>> {
        serde_json::from_value(self.answers.clone())
    }
}

/// Participation joined with its owning user, as returned by the listing
/// and search queries.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ParticipationSummary {
    pub id: i32,
    pub group_id: i32,
    pub attempt_number: i32,
    pub state: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub total_time_seconds: Option<i64>,
    pub user_id: i32,
    pub user_name: String,
    pub user_external_id: String,
}
