use axum::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, not exposed in JSON
    pub created_at: OffsetDateTime,
    /// When the most recent token was minted for this user. Defaults to the
    /// epoch in the schema, so a user who has never logged in reads as an
    /// already lapsed session.
    pub token_issued_at: OffsetDateTime,
}

/// Credential store failures the orchestration layer can act on.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique email constraint hit: a concurrent signup won the insert
    /// after our existence check passed.
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistence seam for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn create(&self, email: &str, password_hash: &str) -> Result<User, StoreError>;
    /// Record a token mint. Last write wins under concurrent mints; every
    /// token already handed out stays valid for its own window.
    async fn set_token_issued_at(&self, id: Uuid, at: OffsetDateTime) -> Result<(), StoreError>;
}

pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at, token_issued_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at, token_issued_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, created_at, token_issued_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                StoreError::DuplicateEmail
            } else {
                StoreError::Database(e)
            }
        })
    }

    async fn set_token_issued_at(&self, id: Uuid, at: OffsetDateTime) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE users
            SET token_issued_at = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory credential store backing handler tests.
    #[derive(Default)]
    pub struct InMemoryUsers {
        rows: Mutex<HashMap<Uuid, User>>,
    }

    impl InMemoryUsers {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn seed(&self, user: User) {
            self.rows.lock().unwrap().insert(user.id, user);
        }

        pub fn get(&self, id: Uuid) -> Option<User> {
            self.rows.lock().unwrap().get(&id).cloned()
        }
    }

    #[async_trait]
    impl UserStore for InMemoryUsers {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
            Ok(self.get(id))
        }

        async fn create(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            if rows.values().any(|u| u.email == email) {
                return Err(StoreError::DuplicateEmail);
            }
            let user = User {
                id: Uuid::new_v4(),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                created_at: OffsetDateTime::now_utc(),
                token_issued_at: OffsetDateTime::UNIX_EPOCH,
            };
            rows.insert(user.id, user.clone());
            Ok(user)
        }

        async fn set_token_issued_at(&self, id: Uuid, at: OffsetDateTime) -> Result<(), StoreError> {
            if let Some(user) = self.rows.lock().unwrap().get_mut(&id) {
                user.token_issued_at = at;
            }
            Ok(())
        }
    }
}
