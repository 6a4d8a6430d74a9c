use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Message on the shared board.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub created_at: OffsetDateTime,
}

impl Message {
    pub async fn create(db: &PgPool, user_id: Uuid, text: &str) -> Result<Message, sqlx::Error> {
        sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (user_id, text)
            VALUES ($1, $2)
            RETURNING id, user_id, text, created_at
            "#,
        )
        .bind(user_id)
        .bind(text)
        .fetch_one(db)
        .await
    }

    /// Most recent messages, newest first.
    pub async fn recent(db: &PgPool, limit: i64) -> Result<Vec<Message>, sqlx::Error> {
        sqlx::query_as::<_, Message>(
            r#"
            SELECT id, user_id, text, created_at
            FROM messages
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(db)
        .await
    }
}
