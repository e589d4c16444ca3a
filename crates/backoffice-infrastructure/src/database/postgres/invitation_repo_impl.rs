//! PostgreSQL invitation repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::error;
use uuid::Uuid;

use backoffice_core::domain::{Invitation, Membership, Role};
use backoffice_core::error::{DomainError, ErrorCode};
use backoffice_core::repositories::InvitationRepository;

use super::errors::{constraint, is_foreign_key_violation, storage};
use super::membership_repo_impl::insert_membership;

pub struct PgInvitationRepository {
    pool: PgPool,
}

impl PgInvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct InvitationRow {
    id: Uuid,
    organization_id: Uuid,
    inviter_user_id: Uuid,
    email: String,
    role: String,
    token: String,
    is_used: bool,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TryFrom<InvitationRow> for Invitation {
    type Error = DomainError;

    fn try_from(row: InvitationRow) -> Result<Self, Self::Error> {
        let role = Role::from_str(&row.role).ok_or_else(|| {
            error!("Unknown role '{}' on invitation {}", row.role, row.id);
            DomainError::storage(ErrorCode::OrganizationOperationFailed, format!("unknown role {}", row.role))
        })?;

        Ok(Invitation {
            id: row.id,
            organization_id: row.organization_id,
            inviter_user_id: row.inviter_user_id,
            email: row.email,
            role,
            token: row.token,
            is_used: row.is_used,
            expires_at: row.expires_at,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl InvitationRepository for PgInvitationRepository {
    async fn create(&self, invitation: &Invitation) -> Result<Invitation, DomainError> {
        let row: InvitationRow = sqlx::query_as(
            r#"
            INSERT INTO invitations (
                id, organization_id, inviter_user_id, email, role,
                token, is_used, expires_at, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, organization_id, inviter_user_id, email, role, token, is_used, expires_at, created_at
            "#,
        )
        .bind(invitation.id)
        .bind(invitation.organization_id)
        .bind(invitation.inviter_user_id)
        .bind(&invitation.email)
        .bind(invitation.role.as_str())
        .bind(&invitation.token)
        .bind(invitation.is_used)
        .bind(invitation.expires_at)
        .bind(invitation.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) && constraint(&e) == Some("invitations_organization_id_fkey") {
                return DomainError::OrganizationNotFound(invitation.organization_id);
            }
            if is_foreign_key_violation(&e) {
                return DomainError::UserNotFound(invitation.inviter_user_id);
            }
            storage(ErrorCode::OrganizationOperationFailed, "creating invitation", e)
        })?;

        row.try_into()
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Invitation>, DomainError> {
        let row: Option<InvitationRow> = sqlx::query_as(
            r#"
            SELECT id, organization_id, inviter_user_id, email, role, token, is_used, expires_at, created_at
            FROM invitations
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage(ErrorCode::OrganizationOperationFailed, "finding invitation", e))?;

        row.map(Invitation::try_from).transpose()
    }

    async fn find_by_organization(&self, organization_id: Uuid) -> Result<Vec<Invitation>, DomainError> {
        let rows: Vec<InvitationRow> = sqlx::query_as(
            r#"
            SELECT id, organization_id, inviter_user_id, email, role, token, is_used, expires_at, created_at
            FROM invitations
            WHERE organization_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage(ErrorCode::OrganizationOperationFailed, "listing invitations", e))?;

        rows.into_iter().map(Invitation::try_from).collect()
    }

    async fn redeem(
        &self,
        token: &str,
        membership: &Membership,
        now: DateTime<Utc>,
    ) -> Result<Membership, DomainError> {
        let code = ErrorCode::OrganizationOperationFailed;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage(code, "starting invitation redeem", e))?;

        // 1. Claim. A concurrent claim blocks on the row lock and then sees
        //    is_used, so only one caller gets the row back.
        let claimed: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE invitations
            SET is_used = TRUE
            WHERE token = $1 AND NOT is_used AND expires_at >= $2
            RETURNING id
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| storage(code, "claiming invitation", e))?;

        if claimed.is_none() {
            let current: Option<InvitationRow> = sqlx::query_as(
                r#"
                SELECT id, organization_id, inviter_user_id, email, role, token, is_used, expires_at, created_at
                FROM invitations
                WHERE token = $1
                "#,
            )
            .bind(token)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| storage(code, "reading unclaimed invitation", e))?;

            return Err(match current {
                None => DomainError::InvitationNotFound,
                Some(row) => Invitation::try_from(row)?
                    .ensure_redeemable(now)
                    .err()
                    .unwrap_or(DomainError::InvitationAlreadyUsed),
            });
        }

        // 2. Join; an error here drops the transaction and releases the claim
        let created = insert_membership(&mut *tx, membership).await?;

        tx.commit()
            .await
            .map_err(|e| storage(code, "committing invitation redeem", e))?;
        Ok(created)
    }
}
