use crate::error::{Error, Result};
use crate::models::answer::SubmittedAnswer;
use crate::models::answer_record::AnswerRecord;
use crate::models::group::Group;
use crate::models::participation::{
    Participation, ParticipationSummary, STATE_FINALIZED, STATE_PENDING,
};
use crate::models::result::QuizResult;
use crate::models::user::User;
use crate::services::scoring_service::ScoringService;
use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, Postgres, Transaction};

/// Outcome of one orchestration call. Every variant carries the
/// participation the caller should act on; `Wait` additionally carries the
/// cooldown still to elapse before the next attempt may start.
#[derive(Debug, Clone)]
pub enum Decision {
    Start(Participation),
    Continue(Participation),
    Wait {
        participation: Participation,
        remaining: Duration,
    },
    Exhausted(Participation),
}

impl Decision {
    pub fn action(&self) -> &'static str {
        match self {
            Decision::Start(_) => "start",
            Decision::Continue(_) => "continue",
            Decision::Wait { .. } => "wait",
            Decision::Exhausted(_) => "exhausted",
        }
    }

    pub fn participation(&self) -> &Participation {
        match self {
            Decision::Start(p)
            | Decision::Continue(p)
            | Decision::Exhausted(p) => p,
            Decision::Wait { participation, .. } => participation,
        }
    }

    pub fn remaining(&self) -> Option<Duration> {
        match self {
            Decision::Wait { remaining, .. } => Some(*remaining),
            _ => None,
        }
    }
}

/// Admission computed from the latest attempt alone, before any mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Admission {
    StartFirst,
    Resume,
    Wait(Duration),
    StartNext(i32),
    Exhausted,
}

/// Pure admission decision over the most recent attempt for (user, group).
fn decide_admission(
    latest: Option<&Participation>,
    group: &Group,
    now: DateTime<Utc>,
) -> Result<Admission> {
    let Some(latest) = latest else {
        return Ok(Admission::StartFirst);
    };

    if latest.is_pending() {
        return Ok(Admission::Resume);
    }

    if latest.attempt_number >= group.max_attempts {
        return Ok(Admission::Exhausted);
    }

    let finished_at = latest.finished_at.ok_or_else(|| {
        Error::Internal(format!(
            "Finalized participation {} has no finished_at",
            latest.id
        ))
    })?;

    let remaining = (finished_at + group.cooldown()) - now;
    if remaining > Duration::zero() {
        Ok(Admission::Wait(remaining))
    } else {
        Ok(Admission::StartNext(latest.attempt_number + 1))
    }
}

#[derive(Clone)]
pub struct ParticipationService {
    pool: PgPool,
}

impl ParticipationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Admission decision for (user, group): resume a pending attempt,
    /// start a new one, report the cooldown still running, or report
    /// exhaustion of the attempt cap. One transaction per call; repeated
    /// calls are idempotent with respect to existing attempts.
    pub async fn orchestrate(
        &self,
        name: &str,
        external_id: &str,
        group_id: i32,
    ) -> Result<Decision> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (external_id, name)
            VALUES ($1, $2)
            ON CONFLICT (external_id) DO UPDATE SET name = EXCLUDED.name
            RETURNING *
            "#,
        )
        .bind(external_id)
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;

        let group = sqlx::query_as::<_, Group>(r#"SELECT * FROM quiz_groups WHERE id = $1"#)
            .bind(group_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::NotFound("Group not found".to_string()))?;

        let now = Utc::now();
        if !group.is_open_at(now) {
            return Err(Error::Forbidden(
                "Group is closed or has not started yet".to_string(),
            ));
        }

        let latest = sqlx::query_as::<_, Participation>(
            r#"
            SELECT * FROM participations
            WHERE user_id = $1 AND group_id = $2
            ORDER BY attempt_number DESC
            LIMIT 1
            "#,
        )
        .bind(user.id)
        .bind(group_id)
        .fetch_optional(&mut *tx)
        .await?;

        let admission = decide_admission(latest.as_ref(), &group, now)?;
        let decision = match (admission, latest) {
            (Admission::StartFirst, _) => {
                let created = Self::create_attempt(&mut tx, user.id, group_id, 1, now).await?;
                Decision::Start(created)
            }
            (Admission::Resume, Some(p)) => Decision::Continue(p),
            (Admission::Wait(remaining), Some(p)) => Decision::Wait {
                participation: p,
                remaining,
            },
            (Admission::StartNext(number), _) => {
                let created =
                    Self::create_attempt(&mut tx, user.id, group_id, number, now).await?;
                Decision::Start(created)
            }
            (Admission::Exhausted, Some(p)) => Decision::Exhausted(p),
            _ => {
                return Err(Error::Internal(
                    "Admission decided over a missing participation".to_string(),
                ))
            }
        };

        tx.commit().await?;

        tracing::info!(
            external_id,
            group_id,
            action = decision.action(),
            participation_id = decision.participation().id,
            "Orchestrated participation"
        );

        Ok(decision)
    }

    /// Insert-or-read-existing on the (user, group, attempt_number) key.
    /// When a concurrent call wins the insert race, the loser reads the
    /// winner's row back instead of surfacing the uniqueness conflict.
    async fn create_attempt(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i32,
        group_id: i32,
        attempt_number: i32,
        now: DateTime<Utc>,
    ) -> Result<Participation> {
        let inserted = sqlx::query_as::<_, Participation>(
            r#"
            INSERT INTO participations (user_id, group_id, attempt_number, state, answers, started_at)
            VALUES ($1, $2, $3, 'pending', '[]'::jsonb, $4)
            ON CONFLICT (user_id, group_id, attempt_number) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(group_id)
        .bind(attempt_number)
        .bind(now)
        .fetch_optional(&mut **tx)
        .await?;

        if let Some(participation) = inserted {
            return Ok(participation);
        }

        tracing::warn!(
            user_id,
            group_id,
            attempt_number,
            "Lost attempt-creation race, reading existing row"
        );

        let existing = sqlx::query_as::<_, Participation>(
            r#"
            SELECT * FROM participations
            WHERE user_id = $1 AND group_id = $2 AND attempt_number = $3
            "#,
        )
        .bind(user_id)
        .bind(group_id)
        .bind(attempt_number)
        .fetch_one(&mut **tx)
        .await?;

        Ok(existing)
    }

    /// Overwrites the answers payload of a pending participation.
    pub async fn update_answers(
        &self,
        participation_id: i32,
        answers: &[SubmittedAnswer],
    ) -> Result<Participation> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Participation>(
            r#"SELECT * FROM participations WHERE id = $1 FOR UPDATE"#,
        )
        .bind(participation_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Participation not found".to_string()))?;

        if !current.is_pending() {
            return Err(Error::BadRequest(
                "Answers of a finalized participation can no longer be updated".to_string(),
            ));
        }

        let answers_json = serde_json::to_value(answers)?;
        let updated = sqlx::query_as::<_, Participation>(
            r#"UPDATE participations SET answers = $2 WHERE id = $1 RETURNING *"#,
        )
        .bind(participation_id)
        .bind(answers_json)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Finalizes a pending participation and aggregates its result in the
    /// same transaction: answers are frozen, finished_at and the
    /// caller-supplied total time are recorded, and the scoring runs
    /// before commit so the state change and the result land atomically.
    pub async fn finalize(
        &self,
        participation_id: i32,
        answers: &[SubmittedAnswer],
        total_time_seconds: i64,
    ) -> Result<(Participation, QuizResult)> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Participation>(
            r#"SELECT * FROM participations WHERE id = $1 FOR UPDATE"#,
        )
        .bind(participation_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Participation not found".to_string()))?;

        if current.state == STATE_FINALIZED {
            return Err(Error::BadRequest(
                "Participation is already finalized".to_string(),
            ));
        }

        let now = Utc::now();
        let answers_json = serde_json::to_value(answers)?;
        let finalized = sqlx::query_as::<_, Participation>(
            r#"
            UPDATE participations
            SET answers = $2, state = 'finalized', finished_at = $3, total_time_seconds = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(participation_id)
        .bind(answers_json)
        .bind(now)
        .bind(total_time_seconds)
        .fetch_one(&mut *tx)
        .await?;

        let result = ScoringService::aggregate(&mut tx, &finalized).await?;

        tx.commit().await?;

        tracing::info!(
            participation_id,
            attempt_number = finalized.attempt_number,
            "Finalized participation"
        );

        Ok((finalized, result))
    }

    pub async fn get_participation(&self, participation_id: i32) -> Result<Participation> {
        let participation = sqlx::query_as::<_, Participation>(
            r#"SELECT * FROM participations WHERE id = $1"#,
        )
        .bind(participation_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(participation)
    }

    /// The normalized per-question records derived at finalization.
    pub async fn list_answer_records(&self, participation_id: i32) -> Result<Vec<AnswerRecord>> {
        let rows = sqlx::query_as::<_, AnswerRecord>(
            r#"SELECT * FROM answer_records WHERE participation_id = $1 ORDER BY question_id"#,
        )
        .bind(participation_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_result(&self, participation_id: i32) -> Result<QuizResult> {
        let result =
            sqlx::query_as::<_, QuizResult>(r#"SELECT * FROM results WHERE participation_id = $1"#)
                .bind(participation_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(result)
    }

    pub async fn list_all(&self) -> Result<Vec<ParticipationSummary>> {
        let rows = sqlx::query_as::<_, ParticipationSummary>(
            r#"
            SELECT p.id, p.group_id, p.attempt_number, p.state, p.started_at, p.finished_at,
                   p.total_time_seconds, u.id AS user_id, u.name AS user_name,
                   u.external_id AS user_external_id
            FROM participations p
            JOIN users u ON u.id = p.user_id
            ORDER BY p.started_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_by_state(
        &self,
        state: &str,
        group_id: Option<i32>,
    ) -> Result<Vec<ParticipationSummary>> {
        if state != STATE_PENDING && state != STATE_FINALIZED {
            return Err(Error::BadRequest(format!(
                "Unknown participation state '{}'",
                state
            )));
        }

        let rows = sqlx::query_as::<_, ParticipationSummary>(
            r#"
            SELECT p.id, p.group_id, p.attempt_number, p.state, p.started_at, p.finished_at,
                   p.total_time_seconds, u.id AS user_id, u.name AS user_name,
                   u.external_id AS user_external_id
            FROM participations p
            JOIN users u ON u.id = p.user_id
            WHERE p.state = $1
              AND ($2::int IS NULL OR p.group_id = $2)
            ORDER BY p.id
            "#,
        )
        .bind(state)
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn search(
        &self,
        external_id: Option<&str>,
        group_id: Option<i32>,
    ) -> Result<Vec<ParticipationSummary>> {
        if external_id.is_none() && group_id.is_none() {
            return Err(Error::BadRequest(
                "At least one search filter (external_id or group_id) is required".to_string(),
            ));
        }

        let rows = sqlx::query_as::<_, ParticipationSummary>(
            r#"
            SELECT p.id, p.group_id, p.attempt_number, p.state, p.started_at, p.finished_at,
                   p.total_time_seconds, u.id AS user_id, u.name AS user_name,
                   u.external_id AS user_external_id
            FROM participations p
            JOIN users u ON u.id = p.user_id
            WHERE ($1::text IS NULL OR u.external_id = $1)
              AND ($2::int IS NULL OR p.group_id = $2)
            ORDER BY p.started_at DESC
            "#,
        )
        .bind(external_id)
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_by_group(&self, group_id: i32) -> Result<Vec<ParticipationSummary>> {
        let rows = sqlx::query_as::<_, ParticipationSummary>(
            r#"
            SELECT p.id, p.group_id, p.attempt_number, p.state, p.started_at, p.finished_at,
                   p.total_time_seconds, u.id AS user_id, u.name AS user_name,
                   u.external_id AS user_external_id
            FROM participations p
            JOIN users u ON u.id = p.user_id
            WHERE p.group_id = $1
            ORDER BY p.started_at DESC
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Answer records and the result row follow via ON DELETE CASCADE.
    pub async fn delete_participation(&self, participation_id: i32) -> Result<()> {
        let deleted =
            sqlx::query_scalar::<_, i32>(r#"DELETE FROM participations WHERE id = $1 RETURNING id"#)
                .bind(participation_id)
                .fetch_optional(&self.pool)
                .await?;

        if deleted.is_none() {
            return Err(Error::NotFound("Participation not found".to_string()));
        }
        Ok(())
    }
}
