use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// External content entity. `correct_option` is NULL for open questions,
/// which never auto-match a selected option.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i32,
    pub prompt: String,
    pub correct_option: Option<i32>,
}
