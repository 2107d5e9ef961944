use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct PendingUserRow {
    pub user_id: i32,
    pub name: String,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct FinishedUserRow {
    pub user_id: i32,
    pub name: String,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct ReportService {
    pool: PgPool,
}

impl ReportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn pending_users(&self) -> Result<Vec<PendingUserRow>> {
        let rows = sqlx::query_as::<_, PendingUserRow>(
            r#"
            SELECT u.id AS user_id, u.name, p.started_at
            FROM participations p
            JOIN users u ON u.id = p.user_id
            WHERE p.state = 'pending'
            ORDER BY p.started_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn finished_users(&self) -> Result<Vec<FinishedUserRow>> {
        let rows = sqlx::query_as::<_, FinishedUserRow>(
            r#"
            SELECT u.id AS user_id, u.name, p.finished_at
            FROM participations p
            JOIN users u ON u.id = p.user_id
            WHERE p.state = 'finalized'
            ORDER BY p.finished_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
