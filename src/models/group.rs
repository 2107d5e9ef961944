use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A quiz group: an admission window plus the attempt policy applied to
/// every user participating in it. Authored externally; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Group {
    pub id: i32,
    pub name: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub max_attempts: i32,
    pub cooldown_seconds: i64,
}

impl Group {
    /// The admission window is half-open: `[starts_at, ends_at)`.
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.starts_at <= now && now < self.ends_at
    }

    pub fn cooldown(&self) -> Duration {
        Duration::seconds(self.cooldown_seconds)
    }
}
