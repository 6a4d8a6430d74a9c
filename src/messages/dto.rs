use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for posting a message to the board.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub user_id: Uuid,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub message: &'static str,
    pub message_id: Uuid,
}
