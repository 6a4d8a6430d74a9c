use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthRequest, LoginResponse, RefreshResponse, SignupResponse},
        jwt::{AuthBearer, TokenKeys},
        password::{hash_password, verify_password},
        repo::StoreError,
        session::{self, Freshness},
    },
    error::ApiError,
    relay::basic_secret,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let Json(mut payload) =
        payload.map_err(|_| ApiError::MalformedRequest("Invalid request body"))?;
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::MalformedRequest("Invalid email"));
    }
    if !(8..=16).contains(&payload.password.chars().count()) {
        warn!("password length out of range");
        return Err(ApiError::MalformedRequest(
            "Password must be 8 to 16 characters",
        ));
    }

    if state.users.find_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict);
    }

    let hash = hash_password(&payload.password).map_err(ApiError::Internal)?;

    let user = match state.users.create(&payload.email, &hash).await {
        Ok(u) => u,
        // Lost the race against a concurrent signup for the same email.
        Err(StoreError::DuplicateEmail) => {
            warn!(email = %payload.email, "email inserted concurrently");
            return Err(ApiError::Conflict);
        }
        Err(e) => return Err(e.into()),
    };

    state
        .relay
        .call(
            "acc",
            json!({
                "scheme": "basic",
                "secret": basic_secret(&user.email, &payload.password),
                "login": true,
                "desc": { "public": { "fn": &user.email } },
            }),
        )
        .await
        .map_err(ApiError::RelayFailure)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User registered successfully",
            user_id: user.id,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(mut payload) =
        payload.map_err(|_| ApiError::MalformedRequest("Invalid request body"))?;
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::MalformedRequest("Invalid email"));
    }

    let user = match state.users.find_by_email(&payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            warn!(user_id = %user.id, "login invalid password");
            return Err(ApiError::InvalidCredentials);
        }
        // Stored hash would not parse. A record fault, but the caller still
        // only learns "invalid credentials".
        Err(e) => {
            error!(error = %e, user_id = %user.id, "stored password hash unreadable");
            return Err(ApiError::InvalidCredentials);
        }
    }

    let keys = TokenKeys::from_ref(&state);
    let now = OffsetDateTime::now_utc();

    match session::check(user.token_issued_at, now, keys.ttl()) {
        Freshness::Fresh { expires_at } => {
            // Hot path: nothing is minted and nothing is written.
            state
                .relay
                .call(
                    "login",
                    json!({
                        "scheme": "basic",
                        "secret": basic_secret(&user.email, &payload.password),
                    }),
                )
                .await
                .map_err(ApiError::RelayFailure)?;

            info!(user_id = %user.id, "login, session still fresh");
            Ok(Json(LoginResponse::StillValid {
                message: "Login successful",
                token_still_valid: true,
                token_expires_at: expires_at.unix_timestamp(),
                user_id: user.id,
            }))
        }
        Freshness::Lapsed => {
            let token = keys
                .sign(user.id, &user.email, now)
                .map_err(ApiError::SigningFailure)?;
            state.users.set_token_issued_at(user.id, now).await?;

            state
                .relay
                .call(
                    "login",
                    json!({
                        "scheme": "basic",
                        "secret": basic_secret(&user.email, &payload.password),
                    }),
                )
                .await
                .map_err(ApiError::RelayFailure)?;

            info!(user_id = %user.id, "login, new token issued");
            Ok(Json(LoginResponse::Renewed {
                message: "Login successful, new token issued",
                token,
                user_id: user.id,
                token_expires_at: (now + keys.ttl()).unix_timestamp(),
            }))
        }
    }
}

/// An explicit renewal request: always mints and persists, never consults
/// the freshness check.
#[instrument(skip(state, bearer))]
pub async fn refresh(
    State(state): State<AppState>,
    bearer: AuthBearer,
) -> Result<Json<RefreshResponse>, ApiError> {
    let AuthBearer(claims) = bearer;

    let user = match state.users.find_by_id(claims.sub).await? {
        Some(u) => u,
        None => {
            warn!(user_id = %claims.sub, "valid token for unknown user");
            return Err(ApiError::UserNotFound);
        }
    };

    let keys = TokenKeys::from_ref(&state);
    let now = OffsetDateTime::now_utc();

    let token = keys
        .sign(user.id, &user.email, now)
        .map_err(ApiError::SigningFailure)?;
    state.users.set_token_issued_at(user.id, now).await?;

    state
        .relay
        .call("hi", json!({ "scheme": "token", "secret": &token }))
        .await
        .map_err(ApiError::RelayFailure)?;

    info!(user_id = %user.id, "token refreshed");
    Ok(Json(RefreshResponse {
        message: "Token refreshed successfully",
        token,
        user_id: user.id,
        token_expires_at: (now + keys.ttl()).unix_timestamp(),
    }))
}
