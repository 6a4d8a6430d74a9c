use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Request-terminal error taxonomy for the gateway.
///
/// Every failure maps to a status code and a short JSON body; internal
/// detail (database errors, signing errors) is logged but never leaked.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    MalformedRequest(&'static str),

    #[error("User already exists")]
    Conflict,

    /// Unknown email and wrong password are deliberately merged so the
    /// response cannot be used for user enumeration.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    InvalidToken(&'static str),

    /// A validated token referencing a user that no longer exists. Rendered
    /// with the same body as `InvalidToken` so callers cannot tell which
    /// check failed.
    #[error("Invalid token")]
    UserNotFound,

    #[error("Database error")]
    StoreUnavailable(#[source] sqlx::Error),

    #[error("Failed to generate token")]
    SigningFailure(#[source] jsonwebtoken::errors::Error),

    #[error("Chat relay request failed")]
    RelayFailure(#[source] anyhow::Error),

    /// Catch-all for faults with no caller-meaningful class, e.g. a password
    /// hasher error.
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::InvalidCredentials
            | ApiError::InvalidToken(_)
            | ApiError::UserNotFound => StatusCode::UNAUTHORIZED,
            ApiError::StoreUnavailable(_)
            | ApiError::SigningFailure(_)
            | ApiError::RelayFailure(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        match &self {
            ApiError::StoreUnavailable(source) => {
                tracing::error!(error = %source, "store operation failed");
            }
            ApiError::SigningFailure(source) => {
                tracing::error!(error = %source, "token signing failed");
            }
            ApiError::RelayFailure(source) => {
                tracing::error!(error = %source, "chat relay call failed");
            }
            ApiError::Internal(source) => {
                tracing::error!(error = %source, "internal error");
            }
            _ => {
                tracing::debug!(%status, %message, "request rejected");
            }
        }

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::StoreUnavailable(err)
    }
}

impl From<crate::auth::repo::StoreError> for ApiError {
    fn from(err: crate::auth::repo::StoreError) -> Self {
        use crate::auth::repo::StoreError;
        match err {
            StoreError::DuplicateEmail => ApiError::Conflict,
            StoreError::Database(e) => ApiError::StoreUnavailable(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            ApiError::MalformedRequest("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::InvalidToken("Missing token").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::UserNotFound.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::StoreUnavailable(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::RelayFailure(anyhow::anyhow!("down")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unknown_user_renders_like_invalid_token() {
        assert_eq!(
            ApiError::UserNotFound.to_string(),
            ApiError::InvalidToken("Invalid token").to_string()
        );
    }

    #[test]
    fn duplicate_email_from_store_maps_to_conflict() {
        let err: ApiError = crate::auth::repo::StoreError::DuplicateEmail.into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn internal_errors_do_not_leak_detail() {
        let err = ApiError::StoreUnavailable(sqlx::Error::PoolTimedOut);
        assert_eq!(err.to_string(), "Database error");
    }
}
