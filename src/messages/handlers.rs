use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument};

use crate::{
    error::ApiError,
    messages::{
        dto::{SendMessageRequest, SendMessageResponse},
        repo::Message,
    },
    state::AppState,
};

const BOARD_TOPIC: &str = "General";
const RECENT_LIMIT: i64 = 50;

pub fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/send-message", post(send_message))
        .route("/messages/recent", get(recent_messages))
}

#[instrument(skip(state, payload))]
pub async fn send_message(
    State(state): State<AppState>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let Json(payload) = payload.map_err(|_| ApiError::MalformedRequest("Invalid request body"))?;
    if payload.text.trim().is_empty() {
        return Err(ApiError::MalformedRequest("Message text is required"));
    }

    let message = Message::create(&state.db, payload.user_id, &payload.text).await?;

    state
        .relay
        .call(
            "pub",
            json!({
                "topic": BOARD_TOPIC,
                "content": { "text": message.text, "from": message.user_id },
            }),
        )
        .await
        .map_err(ApiError::RelayFailure)?;

    info!(message_id = %message.id, user_id = %message.user_id, "message published");
    Ok(Json(SendMessageResponse {
        message: "Message sent successfully",
        message_id: message.id,
    }))
}

#[instrument(skip(state))]
pub async fn recent_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, ApiError> {
    let messages = Message::recent(&state.db, RECENT_LIMIT).await?;
    Ok(Json(messages.into_iter().map(|m| m.text).collect()))
}
