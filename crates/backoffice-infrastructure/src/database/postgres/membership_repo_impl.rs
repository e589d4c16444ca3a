//! PostgreSQL membership repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgExecutor, PgPool};
use tracing::error;
use uuid::Uuid;

use backoffice_core::domain::{Membership, Role};
use backoffice_core::error::{DomainError, ErrorCode};
use backoffice_core::repositories::MembershipRepository;

use super::errors::{constraint, is_foreign_key_violation, is_unique_violation, storage};

pub struct PgMembershipRepository {
    pool: PgPool,
}

impl PgMembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct MembershipRow {
    id: Uuid,
    user_id: Uuid,
    organization_id: Uuid,
    role: String,
    is_active: bool,
    joined_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MembershipRow> for Membership {
    type Error = DomainError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        let role = Role::from_str(&row.role).ok_or_else(|| {
            error!("Unknown role '{}' on membership {}", row.role, row.id);
            DomainError::storage(ErrorCode::OrganizationOperationFailed, format!("unknown role {}", row.role))
        })?;

        Ok(Membership {
            id: row.id,
            user_id: row.user_id,
            organization_id: row.organization_id,
            role,
            is_active: row.is_active,
            joined_at: row.joined_at,
            updated_at: row.updated_at,
        })
    }
}

fn membership_write_error(e: sqlx::Error, membership: &Membership) -> DomainError {
    if is_unique_violation(&e) && constraint(&e) == Some("memberships_active_unique") {
        return DomainError::MembershipAlreadyExists {
            user_id: membership.user_id,
            organization_id: membership.organization_id,
        };
    }
    if is_foreign_key_violation(&e) {
        return match constraint(&e) {
            Some("memberships_organization_id_fkey") => DomainError::OrganizationNotFound(membership.organization_id),
            _ => DomainError::UserNotFound(membership.user_id),
        };
    }
    storage(ErrorCode::OrganizationOperationFailed, "writing membership", e)
}

/// Runs inside the caller's transaction: organization creation and
/// invitation redemption.
pub(super) async fn insert_membership<'e, E>(executor: E, membership: &Membership) -> Result<Membership, DomainError>
where
    E: PgExecutor<'e>,
{
    let row: MembershipRow = sqlx::query_as(
        r#"
        INSERT INTO memberships (id, user_id, organization_id, role, is_active, joined_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, user_id, organization_id, role, is_active, joined_at, updated_at
        "#,
    )
    .bind(membership.id)
    .bind(membership.user_id)
    .bind(membership.organization_id)
    .bind(membership.role.as_str())
    .bind(membership.is_active)
    .bind(membership.joined_at)
    .bind(membership.updated_at)
    .fetch_one(executor)
    .await
    .map_err(|e| membership_write_error(e, membership))?;

    row.try_into()
}

fn collect(rows: Vec<MembershipRow>) -> Result<Vec<Membership>, DomainError> {
    rows.into_iter().map(Membership::try_from).collect()
}

#[async_trait]
impl MembershipRepository for PgMembershipRepository {
    async fn find_by_user_and_organization(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<Membership>, DomainError> {
        let row: Option<MembershipRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, organization_id, role, is_active, joined_at, updated_at
            FROM memberships
            WHERE user_id = $1 AND organization_id = $2 AND is_active
            "#,
        )
        .bind(user_id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage(ErrorCode::OrganizationOperationFailed, "finding membership", e))?;

        row.map(Membership::try_from).transpose()
    }

    async fn find_by_organization(&self, organization_id: Uuid) -> Result<Vec<Membership>, DomainError> {
        let rows: Vec<MembershipRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, organization_id, role, is_active, joined_at, updated_at
            FROM memberships
            WHERE organization_id = $1
            ORDER BY joined_at
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage(ErrorCode::OrganizationOperationFailed, "listing members", e))?;

        collect(rows)
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Membership>, DomainError> {
        let rows: Vec<MembershipRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, organization_id, role, is_active, joined_at, updated_at
            FROM memberships
            WHERE user_id = $1
            ORDER BY joined_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage(ErrorCode::OrganizationOperationFailed, "listing user memberships", e))?;

        collect(rows)
    }

    async fn update(&self, membership: &Membership) -> Result<Membership, DomainError> {
        let row: Option<MembershipRow> = sqlx::query_as(
            r#"
            UPDATE memberships
            SET role = $2, is_active = $3, updated_at = $4
            WHERE id = $1
            RETURNING id, user_id, organization_id, role, is_active, joined_at, updated_at
            "#,
        )
        .bind(membership.id)
        .bind(membership.role.as_str())
        .bind(membership.is_active)
        .bind(membership.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| membership_write_error(e, membership))?;

        row.map(Membership::try_from)
            .transpose()?
            .ok_or(DomainError::MembershipNotFound {
                user_id: membership.user_id,
                organization_id: membership.organization_id,
            })
    }

    async fn delete(&self, user_id: Uuid, organization_id: Uuid) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM memberships WHERE user_id = $1 AND organization_id = $2")
            .bind(user_id)
            .bind(organization_id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage(ErrorCode::OrganizationOperationFailed, "removing membership", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MembershipNotFound { user_id, organization_id });
        }
        Ok(())
    }
}
