use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Normalized per-question record derived from a finalized participation's
/// answers payload. Unique per (participation, question); resubmission
/// overwrites the selected option.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnswerRecord {
    pub id: i32,
    pub participation_id: i32,
    pub question_id: i32,
    pub selected_option: i32,
}
