use crate::config::get_config;
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};

/// Issues the session token returned by the orchestration endpoint. The
/// token authorizes later answer updates and finalization of the same
/// participation only.
pub fn issue_session_token(external_id: &str, participation_id: i32, group_id: i32) -> Result<String> {
    let config = get_config();
    let expires_at = Utc::now() + Duration::minutes(config.session_ttl_minutes);
    let claims = Claims {
        sub: external_id.to_string(),
        exp: expires_at.timestamp() as usize,
        participation_id,
        group_id,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Failed to issue session token: {}", e)))
}
