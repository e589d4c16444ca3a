//! PostgreSQL organization repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use backoffice_core::domain::{Membership, Organization};
use backoffice_core::error::{DomainError, ErrorCode};
use backoffice_core::repositories::OrganizationRepository;

use super::errors::{is_foreign_key_violation, storage};
use super::membership_repo_impl::insert_membership;

pub struct PgOrganizationRepository {
    pool: PgPool,
}

impl PgOrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct OrganizationRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    owner_user_id: Uuid,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrganizationRow> for Organization {
    fn from(row: OrganizationRow) -> Self {
        Organization {
            id: row.id,
            name: row.name,
            description: row.description,
            owner_user_id: row.owner_user_id,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn organization_write_error(e: sqlx::Error, organization: &Organization) -> DomainError {
    if is_foreign_key_violation(&e) {
        return DomainError::UserNotFound(organization.owner_user_id);
    }
    storage(ErrorCode::OrganizationOperationFailed, "writing organization", e)
}

#[async_trait]
impl OrganizationRepository for PgOrganizationRepository {
    async fn create(&self, organization: &Organization, owner: &Membership) -> Result<Organization, DomainError> {
        let code = ErrorCode::OrganizationOperationFailed;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage(code, "starting organization create", e))?;

        let row: OrganizationRow = sqlx::query_as(
            r#"
            INSERT INTO organizations (
                id, name, description, owner_user_id,
                is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, description, owner_user_id, is_active, created_at, updated_at
            "#,
        )
        .bind(organization.id)
        .bind(&organization.name)
        .bind(&organization.description)
        .bind(organization.owner_user_id)
        .bind(organization.is_active)
        .bind(organization.created_at)
        .bind(organization.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| organization_write_error(e, organization))?;

        insert_membership(&mut *tx, owner).await?;

        tx.commit()
            .await
            .map_err(|e| storage(code, "committing organization create", e))?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>, DomainError> {
        let row: Option<OrganizationRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, owner_user_id, is_active, created_at, updated_at
            FROM organizations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage(ErrorCode::OrganizationOperationFailed, "finding organization", e))?;

        Ok(row.map(Into::into))
    }

    async fn update(&self, organization: &Organization) -> Result<Organization, DomainError> {
        let row: Option<OrganizationRow> = sqlx::query_as(
            r#"
            UPDATE organizations
            SET name = $2, description = $3, owner_user_id = $4, is_active = $5, updated_at = $6
            WHERE id = $1
            RETURNING id, name, description, owner_user_id, is_active, created_at, updated_at
            "#,
        )
        .bind(organization.id)
        .bind(&organization.name)
        .bind(&organization.description)
        .bind(organization.owner_user_id)
        .bind(organization.is_active)
        .bind(organization.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| organization_write_error(e, organization))?;

        row.map(Into::into)
            .ok_or(DomainError::OrganizationNotFound(organization.id))
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Organization>, DomainError> {
        let rows: Vec<OrganizationRow> = sqlx::query_as(
            r#"
            SELECT o.id, o.name, o.description, o.owner_user_id, o.is_active, o.created_at, o.updated_at
            FROM organizations o
            INNER JOIN memberships m ON m.organization_id = o.id
            WHERE m.user_id = $1 AND m.is_active
            ORDER BY o.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage(ErrorCode::OrganizationOperationFailed, "listing user organizations", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
