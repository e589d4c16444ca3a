//! PostgreSQL user profile repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use backoffice_core::domain::UserProfile;
use backoffice_core::error::{DomainError, ErrorCode};
use backoffice_core::repositories::UserProfileRepository;

use super::errors::{is_foreign_key_violation, is_unique_violation, storage};

pub struct PgUserProfileRepository {
    pool: PgPool,
}

impl PgUserProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserProfileRow {
    user_id: Uuid,
    first_name: String,
    last_name: String,
    bio: Option<String>,
    profile_picture: Option<String>,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserProfileRow> for UserProfile {
    fn from(row: UserProfileRow) -> Self {
        UserProfile {
            user_id: row.user_id,
            first_name: row.first_name,
            last_name: row.last_name,
            bio: row.bio,
            profile_picture: row.profile_picture,
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl UserProfileRepository for PgUserProfileRepository {
    async fn create(&self, profile: &UserProfile) -> Result<UserProfile, DomainError> {
        let row: UserProfileRow = sqlx::query_as(
            r#"
            INSERT INTO user_profiles (
                user_id, first_name, last_name, bio,
                profile_picture, phone, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING user_id, first_name, last_name, bio, profile_picture, phone, created_at, updated_at
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.bio)
        .bind(&profile.profile_picture)
        .bind(&profile.phone)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return DomainError::ProfileAlreadyExists(profile.user_id);
            }
            if is_foreign_key_violation(&e) {
                return DomainError::UserNotFound(profile.user_id);
            }
            storage(ErrorCode::UserOperationFailed, "creating user profile", e)
        })?;

        Ok(row.into())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<UserProfile>, DomainError> {
        let row: Option<UserProfileRow> = sqlx::query_as(
            r#"
            SELECT user_id, first_name, last_name, bio, profile_picture, phone, created_at, updated_at
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage(ErrorCode::UserOperationFailed, "finding user profile", e))?;

        Ok(row.map(Into::into))
    }

    async fn update(&self, profile: &UserProfile) -> Result<UserProfile, DomainError> {
        let row: Option<UserProfileRow> = sqlx::query_as(
            r#"
            UPDATE user_profiles
            SET first_name = $2, last_name = $3, bio = $4,
                profile_picture = $5, phone = $6, updated_at = $7
            WHERE user_id = $1
            RETURNING user_id, first_name, last_name, bio, profile_picture, phone, created_at, updated_at
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.bio)
        .bind(&profile.profile_picture)
        .bind(&profile.phone)
        .bind(profile.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage(ErrorCode::UserOperationFailed, "updating user profile", e))?;

        row.map(Into::into)
            .ok_or(DomainError::ProfileNotFound(profile.user_id))
    }
}
