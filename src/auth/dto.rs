use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for signup and login.
#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub email: String,
    pub password: String,
}

/// Response for a successful signup.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: &'static str,
    pub user_id: Uuid,
}

/// Login has two success shapes depending on the freshness branch.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LoginResponse {
    /// The previously issued token is still inside its window; no new token
    /// is minted and the caller keeps using the one it has.
    StillValid {
        message: &'static str,
        token_still_valid: bool,
        token_expires_at: i64,
        user_id: Uuid,
    },
    /// The window lapsed and a fresh token was minted.
    Renewed {
        message: &'static str,
        token: String,
        user_id: Uuid,
        token_expires_at: i64,
    },
}

/// Response for a successful refresh.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub message: &'static str,
    pub token: String,
    pub user_id: Uuid,
    pub token_expires_at: i64,
}
