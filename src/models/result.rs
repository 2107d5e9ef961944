use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Aggregated outcome of a finalized participation. Unique per
/// participation; fully replaced every time aggregation runs.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizResult {
    pub id: i32,
    pub participation_id: i32,
    pub total_questions: i32,
    pub correct_count: i32,
    pub accuracy_percentage: Decimal,
    pub total_time_seconds: i64,
}
