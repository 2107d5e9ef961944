use serde::{Deserialize, Serialize};

/// One entry of a participation's submitted-answers payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: i32,
    pub selected_option: i32,
}
