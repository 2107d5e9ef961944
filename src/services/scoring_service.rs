use crate::error::{Error, Result};
use crate::models::answer_record::AnswerRecord;
use crate::models::participation::Participation;
use crate::models::question::Question;
use crate::models::result::QuizResult;
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};

/// Aggregates a finalized participation into per-question answer records
/// and a stored result. Runs inside the transaction that finalizes the
/// participation, so a failed aggregation rolls the finalization back.
pub struct ScoringService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSummary {
    pub total_questions: i32,
    pub correct_count: i32,
    pub accuracy_percentage: Decimal,
}

impl ScoringService {
    /// Pure scoring of answer records against the question bank. A record
    /// whose question has no designated correct option (open question)
    /// never counts as correct. Accuracy is 0 when nothing was answered,
    /// not a division fault.
    pub fn score_answers(questions: &[Question], records: &[AnswerRecord]) -> ScoreSummary {
        let total_questions = records.len() as i32;
        let correct_count = records
            .iter()
            .filter(|record| {
                questions
                    .iter()
                    .find(|q| q.id == record.question_id)
                    .and_then(|q| q.correct_option)
                    .map(|correct| correct == record.selected_option)
                    .unwrap_or(false)
            })
            .count() as i32;

        let accuracy_percentage = if total_questions > 0 {
            (Decimal::from(correct_count * 100) / Decimal::from(total_questions)).round_dp(2)
        } else {
            Decimal::ZERO
        };

        ScoreSummary {
            total_questions,
            correct_count,
            accuracy_percentage,
        }
    }

    /// Explodes the participation's answers payload into answer records,
    /// scores them against the question bank and upserts the result row.
    /// Never mutates the participation itself.
    pub async fn aggregate(
        tx: &mut Transaction<'_, Postgres>,
        participation: &Participation,
    ) -> Result<QuizResult> {
        let answers = participation.submitted_answers()?;
        let total_time_seconds = participation.total_time_seconds.ok_or_else(|| {
            Error::Internal(format!(
                "Participation {} has no total time to aggregate",
                participation.id
            ))
        })?;

        for answer in &answers {
            sqlx::query(
                r#"
                INSERT INTO answer_records (participation_id, question_id, selected_option)
                VALUES ($1, $2, $3)
                ON CONFLICT (participation_id, question_id)
                DO UPDATE SET selected_option = EXCLUDED.selected_option
                "#,
            )
            .bind(participation.id)
            .bind(answer.question_id)
            .bind(answer.selected_option)
            .execute(&mut **tx)
            .await?;
        }

        let records = sqlx::query_as::<_, AnswerRecord>(
            r#"
            SELECT * FROM answer_records
            WHERE participation_id = $1
            ORDER BY question_id
            "#,
        )
        .bind(participation.id)
        .fetch_all(&mut **tx)
        .await?;

        let question_ids: Vec<i32> = records.iter().map(|r| r.question_id).collect();
        let questions = sqlx::query_as::<_, Question>(
            r#"SELECT * FROM questions WHERE id = ANY($1)"#,
        )
        .bind(&question_ids)
        .fetch_all(&mut **tx)
        .await?;

        let summary = Self::score_answers(&questions, &records);

        let result = sqlx::query_as::<_, QuizResult>(
            r#"
            INSERT INTO results (participation_id, total_questions, correct_count, accuracy_percentage, total_time_seconds)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (participation_id)
            DO UPDATE SET total_questions = EXCLUDED.total_questions,
                          correct_count = EXCLUDED.correct_count,
                          accuracy_percentage = EXCLUDED.accuracy_percentage,
                          total_time_seconds = EXCLUDED.total_time_seconds
            RETURNING *
            "#,
        )
        .bind(participation.id)
        .bind(summary.total_questions)
        .bind(summary.correct_count)
        .bind(summary.accuracy_percentage)
        .bind(total_time_seconds)
        .fetch_one(&mut **tx)
        .await?;

        tracing::info!(
            participation_id = participation.id,
            total = summary.total_questions,
            correct = summary.correct_count,
            "Aggregated participation result"
        );

        Ok(result)
    }
}
