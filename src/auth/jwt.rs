use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Claims carried by every token: user identity and expiry.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
}

/// HS256 signing and verification keys plus the token validity window.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl FromRef<AppState> for TokenKeys {
    fn from_ref(state: &AppState) -> Self {
        let jwt = &state.config.jwt;
        TokenKeys::new(&jwt.secret, Duration::hours(jwt.ttl_hours))
    }
}

impl TokenKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Validity window, shared with the session freshness check.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token expiring at `now + ttl`. `now` is passed in so issuance
    /// and the persisted `token_issued_at` share one clock read.
    pub fn sign(
        &self,
        user_id: Uuid,
        email: &str,
        now: OffsetDateTime,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let exp = now + self.ttl;
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    /// Rejects wrong algorithm or secret, expired tokens (zero leeway), and
    /// claims that do not decode.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

/// Extracts and verifies the bearer token from the `Authorization` header.
///
/// Each rejection reason keeps its own message so callers can tell a missing
/// header from a malformed prefix from a failed verification, all under 401.
pub struct AuthBearer(pub Claims);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthBearer
where
    S: Send + Sync,
    TokenKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = TokenKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::InvalidToken("Missing token"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::InvalidToken("Invalid token format"))?;

        match keys.verify(token) {
            Ok(claims) => Ok(AuthBearer(claims)),
            Err(e) => {
                warn!(error = %e, "token verification failed");
                Err(ApiError::InvalidToken("Invalid token"))
            }
        }
    }
}
