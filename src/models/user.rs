use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A quiz participant, keyed by their stable external identifier.
/// Re-registering with a known identifier overwrites the display name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub external_id: String,
    pub name: String,
}
