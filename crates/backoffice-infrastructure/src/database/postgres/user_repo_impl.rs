// ============================================================================
// Back-office Infrastructure - PostgreSQL User Repository
// File: crates/backoffice-infrastructure/src/database/postgres/user_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use backoffice_core::domain::User;
use backoffice_core::error::{DomainError, ErrorCode};
use backoffice_core::repositories::UserRepository;

use super::errors::{constraint, is_unique_violation, storage};

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            name: row.name,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn user_write_error(e: sqlx::Error, user: &User) -> DomainError {
    if is_unique_violation(&e) && constraint(&e) == Some("users_email_unique") {
        return DomainError::EmailAlreadyExists(user.email.clone());
    }
    storage(ErrorCode::UserOperationFailed, "writing user", e)
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: &User) -> Result<User, DomainError> {
        info!("Creating user: {}", user.id);

        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (id, email, name, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, email, name, is_active, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| user_write_error(e, user))?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, name, is_active, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage(ErrorCode::UserOperationFailed, "finding user by id", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, name, is_active, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage(ErrorCode::UserOperationFailed, "finding user by email", e))?;

        Ok(row.map(Into::into))
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            UPDATE users
            SET email = $2, name = $3, is_active = $4, updated_at = $5
            WHERE id = $1
            RETURNING id, email, name, is_active, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.is_active)
        .bind(user.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| user_write_error(e, user))?;

        row.map(Into::into).ok_or(DomainError::UserNotFound(user.id))
    }

    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<User>, DomainError> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
            SELECT id, email, name, is_active, created_at, updated_at
            FROM users
            ORDER BY created_at DESC, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage(ErrorCode::UserOperationFailed, "listing users", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
