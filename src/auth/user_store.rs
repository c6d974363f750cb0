//! User Storage
//! Mission: Persist user identities and authenticate them by email + password

use crate::auth::models::{avatar_for_email, User, UserPublicView};
use crate::db::Database;
use crate::error::AuthError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use bcrypt::{hash, verify};
use chrono::Utc;
use rusqlite::{params, ErrorCode, OptionalExtension, Row};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// Failure of `UserBackend::insert`
#[derive(Debug, Error)]
pub enum InsertError {
    /// Unique constraint on email violated
    #[error("duplicate key")]
    DuplicateKey,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Persistence backend for user records
#[async_trait]
pub trait UserBackend: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>>;
    async fn insert(&self, user: &User) -> Result<Uuid, InsertError>;
    async fn remove(&self, id: &Uuid) -> Result<()>;
}

/// `UserBackend` on the shared SQLite database
pub struct SqliteUserBackend {
    db: Database,
}

impl SqliteUserBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

const USER_COLUMNS: &str = "id, name, email, password_hash, avatar, date";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(User {
        id,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        avatar: row.get(4)?,
        date: row.get(5)?,
    })
}

#[async_trait]
impl UserBackend for SqliteUserBackend {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.db.conn().lock().await;
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            user_from_row,
        )
        .optional()
        .context("Failed to look up user by email")
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        let conn = self.db.conn().lock().await;
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id.to_string()],
            user_from_row,
        )
        .optional()
        .context("Failed to look up user by id")
    }

    async fn insert(&self, user: &User) -> Result<Uuid, InsertError> {
        let conn = self.db.conn().lock().await;
        let result = conn.execute(
            "INSERT INTO users (id, name, email, password_hash, avatar, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id.to_string(),
                user.name,
                user.email,
                user.password_hash,
                user.avatar,
                user.date,
            ],
        );

        match result {
            Ok(_) => Ok(user.id),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(InsertError::DuplicateKey)
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to insert user").into()),
        }
    }

    async fn remove(&self, id: &Uuid) -> Result<()> {
        let conn = self.db.conn().lock().await;
        conn.execute("DELETE FROM users WHERE id = ?1", params![id.to_string()])
            .context("Failed to delete user")?;
        Ok(())
    }
}

/// Registers users and checks their passwords
pub struct CredentialStore {
    backend: Arc<dyn UserBackend>,
    bcrypt_cost: u32,
    // Compared against when the email is unknown, so both failure paths cost one bcrypt verify
    dummy_hash: String,
}

impl CredentialStore {
    pub fn new(backend: Arc<dyn UserBackend>, bcrypt_cost: u32) -> Result<Self, AuthError> {
        let dummy_hash = hash("devhub-dummy-password", bcrypt_cost)
            .map_err(|e| AuthError::Fatal(format!("Invalid bcrypt cost {bcrypt_cost}: {e}")))?;

        Ok(Self {
            backend,
            bcrypt_cost,
            dummy_hash,
        })
    }

    /// Create a user. Fails with `DuplicateEmail` if the email is taken.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        raw_password: &str,
    ) -> Result<Uuid, AuthError> {
        if self.backend.find_by_email(email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password = raw_password.to_string();
        let cost = self.bcrypt_cost;
        let password_hash = tokio::task::spawn_blocking(move || hash(password, cost))
            .await
            .map_err(|e| AuthError::Fatal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| AuthError::Fatal(format!("Failed to hash password: {e}")))?;

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            avatar: avatar_for_email(email),
            date: Utc::now().to_rfc3339(),
        };

        // The pre-check can race with a concurrent registration; the unique index decides
        let id = self.backend.insert(&user).await.map_err(|e| match e {
            InsertError::DuplicateKey => AuthError::DuplicateEmail,
            InsertError::Backend(e) => AuthError::Storage(e),
        })?;

        info!("✅ Registered user {} ({})", user.email, id);
        Ok(id)
    }

    /// Check an email/password pair. Unknown email and wrong password are the
    /// same `InvalidCredentials` error.
    pub async fn verify_password(&self, email: &str, raw_password: &str) -> Result<Uuid, AuthError> {
        let user = self.backend.find_by_email(email).await?;

        let stored_hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| self.dummy_hash.clone());
        let password = raw_password.to_string();

        let matches = tokio::task::spawn_blocking(move || verify(password, &stored_hash))
            .await
            .map_err(|e| AuthError::Fatal(format!("Password check task failed: {e}")))?
            .map_err(|e| AuthError::Fatal(format!("Stored password hash unreadable: {e}")))?;

        match user {
            Some(user) if matches => Ok(user.id),
            _ => {
                warn!("❌ Failed login attempt: {}", email);
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Public view of a user, without the password hash
    pub async fn get_by_id(&self, user_id: &Uuid) -> Result<UserPublicView, AuthError> {
        self.backend
            .find_by_id(user_id)
            .await?
            .map(|u| UserPublicView::from_user(&u))
            .ok_or(AuthError::NotFound)
    }

    /// Delete a user record. Deleting an absent id is a no-op.
    pub async fn remove(&self, user_id: &Uuid) -> Result<(), AuthError> {
        self.backend.remove(user_id).await?;
        info!("🗑️  Deleted user: {}", user_id);
        Ok(())
    }
}
