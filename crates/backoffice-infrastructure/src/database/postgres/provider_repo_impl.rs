// ============================================================================
// Back-office Infrastructure - PostgreSQL Provider Repository
// File: crates/backoffice-infrastructure/src/database/postgres/provider_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::warn;
use uuid::Uuid;

use backoffice_core::domain::{Metadata, Provider};
use backoffice_core::dto::ListQuery;
use backoffice_core::error::{DomainError, ErrorCode};
use backoffice_core::repositories::ProviderRepository;
use backoffice_shared::constants::SEARCH_RESULT_LIMIT;
use backoffice_shared::utils::like_pattern;

use super::errors::{constraint, is_foreign_key_violation, is_unique_violation, storage};

const PROVIDER_COLUMNS: &str =
    "id, user_id, organization_id, name, provider_code, is_active, metadata, created_at, updated_at";

pub struct PgProviderRepository {
    pool: PgPool,
}

impl PgProviderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ProviderRow {
    id: Uuid,
    user_id: Option<Uuid>,
    organization_id: Uuid,
    name: String,
    provider_code: Option<String>,
    is_active: bool,
    metadata: Json<Metadata>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProviderRow> for Provider {
    fn from(row: ProviderRow) -> Self {
        Provider {
            id: row.id,
            user_id: row.user_id,
            organization_id: row.organization_id,
            name: row.name,
            provider_code: row.provider_code,
            is_active: row.is_active,
            metadata: row.metadata.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn provider_write_error(e: sqlx::Error, provider: &Provider, code: ErrorCode) -> DomainError {
    if is_unique_violation(&e) && constraint(&e) == Some("providers_name_org_unique") {
        warn!("Unique violation on provider name '{}'", provider.name);
        return DomainError::ProviderNameExists {
            name: provider.name.clone(),
            organization_id: provider.organization_id,
        };
    }
    if is_foreign_key_violation(&e) {
        match (constraint(&e), provider.user_id) {
            (Some("providers_user_id_fkey"), Some(user_id)) => return DomainError::UserNotFound(user_id),
            (Some("providers_organization_id_fkey"), _) => {
                return DomainError::OrganizationNotFound(provider.organization_id)
            }
            _ => {}
        }
    }
    storage(code, "writing provider", e)
}

fn push_list_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &ListQuery) {
    qb.push(" WHERE TRUE");
    if let Some(organization_id) = query.organization_id {
        qb.push(" AND organization_id = ").push_bind(organization_id);
    }
    if let Some(is_active) = query.is_active {
        qb.push(" AND is_active = ").push_bind(is_active);
    }
    if let Some(term) = &query.search {
        let pattern = like_pattern(term);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR provider_code ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl ProviderRepository for PgProviderRepository {
    async fn create(&self, provider: &Provider) -> Result<Provider, DomainError> {
        let row: ProviderRow = sqlx::query_as(
            r#"
            INSERT INTO providers (
                id, user_id, organization_id, name, provider_code,
                is_active, metadata, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING
                id, user_id, organization_id, name, provider_code,
                is_active, metadata, created_at, updated_at
            "#,
        )
        .bind(provider.id)
        .bind(provider.user_id)
        .bind(provider.organization_id)
        .bind(&provider.name)
        .bind(&provider.provider_code)
        .bind(provider.is_active)
        .bind(Json(&provider.metadata))
        .bind(provider.created_at)
        .bind(provider.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| provider_write_error(e, provider, ErrorCode::ProviderCreateFailed))?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Provider>, DomainError> {
        let row: Option<ProviderRow> = sqlx::query_as(
            r#"
            SELECT
                id, user_id, organization_id, name, provider_code,
                is_active, metadata, created_at, updated_at
            FROM providers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage(ErrorCode::ProviderListFailed, "finding provider by id", e))?;

        Ok(row.map(Into::into))
    }

    async fn update(&self, provider: &Provider) -> Result<Provider, DomainError> {
        let row: Option<ProviderRow> = sqlx::query_as(
            r#"
            UPDATE providers
            SET
                user_id = $2,
                name = $3,
                provider_code = $4,
                is_active = $5,
                metadata = $6,
                updated_at = $7
            WHERE id = $1
            RETURNING
                id, user_id, organization_id, name, provider_code,
                is_active, metadata, created_at, updated_at
            "#,
        )
        .bind(provider.id)
        .bind(provider.user_id)
        .bind(&provider.name)
        .bind(&provider.provider_code)
        .bind(provider.is_active)
        .bind(Json(&provider.metadata))
        .bind(provider.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| provider_write_error(e, provider, ErrorCode::ProviderUpdateFailed))?;

        row.map(Into::into).ok_or(DomainError::ProviderNotFound(provider.id))
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM providers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage(ErrorCode::ProviderDeleteFailed, "deleting provider", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ProviderNotFound(id));
        }
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<(Vec<Provider>, u64), DomainError> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM providers");
        push_list_filters(&mut count_qb, query);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage(ErrorCode::ProviderListFailed, "counting providers", e))?;

        let mut qb = QueryBuilder::new(format!("SELECT {} FROM providers", PROVIDER_COLUMNS));
        push_list_filters(&mut qb, query);
        qb.push(format!(
            " ORDER BY {} {}, id",
            query.sort_by.as_column(),
            query.sort_order.as_sql()
        ));
        qb.push(" LIMIT ")
            .push_bind(query.pagination.limit() as i64)
            .push(" OFFSET ")
            .push_bind(query.pagination.offset() as i64);

        let rows: Vec<ProviderRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage(ErrorCode::ProviderListFailed, "listing providers", e))?;

        Ok((rows.into_iter().map(Into::into).collect(), total as u64))
    }

    async fn find_by_organization(&self, organization_id: Uuid) -> Result<Vec<Provider>, DomainError> {
        let rows: Vec<ProviderRow> = sqlx::query_as(
            r#"
            SELECT
                id, user_id, organization_id, name, provider_code,
                is_active, metadata, created_at, updated_at
            FROM providers
            WHERE organization_id = $1
            ORDER BY name
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage(ErrorCode::ProviderListFailed, "listing organization providers", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn search(&self, term: &str, organization_id: Uuid) -> Result<Vec<Provider>, DomainError> {
        let rows: Vec<ProviderRow> = sqlx::query_as(
            r#"
            SELECT
                id, user_id, organization_id, name, provider_code,
                is_active, metadata, created_at, updated_at
            FROM providers
            WHERE organization_id = $1
              AND is_active
              AND (name ILIKE $2 OR provider_code ILIKE $2)
            ORDER BY name
            LIMIT $3
            "#,
        )
        .bind(organization_id)
        .bind(like_pattern(term))
        .bind(SEARCH_RESULT_LIMIT as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage(ErrorCode::ProviderSearchFailed, "searching providers", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn exists_by_name_and_organization(
        &self,
        name: &str,
        organization_id: Uuid,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM providers
                WHERE organization_id = $1
                  AND name = $2
                  AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(organization_id)
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage(ErrorCode::ProviderListFailed, "checking provider name", e))
    }
}
