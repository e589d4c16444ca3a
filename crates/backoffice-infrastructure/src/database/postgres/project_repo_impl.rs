// ============================================================================
// Back-office Infrastructure - PostgreSQL Project Repository
// File: crates/backoffice-infrastructure/src/database/postgres/project_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{info, warn};
use uuid::Uuid;

use backoffice_core::domain::{Metadata, Project, ProjectProvider, ProjectProviderDetails, ProjectStats};
use backoffice_core::dto::ListQuery;
use backoffice_core::error::{DomainError, ErrorCode, ErrorDomain};
use backoffice_core::repositories::ProjectRepository;
use backoffice_shared::utils::like_pattern;

use super::errors::{constraint, is_foreign_key_violation, is_unique_violation, storage};

const PROJECT_COLUMNS: &str =
    "id, organization_id, name, description, is_active, metadata, created_at, updated_at";

pub struct PgProjectRepository {
    pool: PgPool,
}

impl PgProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row types for SQLx mapping
#[derive(Debug, FromRow)]
struct ProjectRow {
    id: Uuid,
    organization_id: Uuid,
    name: String,
    description: Option<String>,
    is_active: bool,
    metadata: Json<Metadata>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: row.id,
            organization_id: row.organization_id,
            name: row.name,
            description: row.description,
            is_active: row.is_active,
            metadata: row.metadata.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ProjectProviderRow {
    id: Uuid,
    project_id: Uuid,
    provider_id: Uuid,
    organization_id: Uuid,
    role: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProjectProviderRow> for ProjectProvider {
    fn from(row: ProjectProviderRow) -> Self {
        ProjectProvider {
            id: row.id,
            project_id: row.project_id,
            provider_id: row.provider_id,
            organization_id: row.organization_id,
            role: row.role,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ProviderDetailsRow {
    provider_id: Uuid,
    provider_name: String,
    role: Option<String>,
    is_active: bool,
    joined_at: DateTime<Utc>,
}

impl From<ProviderDetailsRow> for ProjectProviderDetails {
    fn from(row: ProviderDetailsRow) -> Self {
        ProjectProviderDetails {
            provider_id: row.provider_id,
            provider_name: row.provider_name,
            role: row.role,
            is_active: row.is_active,
            joined_at: row.joined_at,
        }
    }
}

/// Maps constraint violations on `projects` writes to domain errors.
fn project_write_error(e: sqlx::Error, project: &Project, code: ErrorCode) -> DomainError {
    if is_unique_violation(&e) && constraint(&e) == Some("projects_name_org_unique") {
        warn!("Unique violation on project name '{}'", project.name);
        return DomainError::ProjectNameExists {
            name: project.name.clone(),
            organization_id: project.organization_id,
        };
    }
    if is_foreign_key_violation(&e) && constraint(&e) == Some("projects_organization_id_fkey") {
        return DomainError::OrganizationNotFound(project.organization_id);
    }
    storage(code, "writing project", e)
}

/// Maps constraint violations on `project_providers` writes to domain errors.
fn link_write_error(e: sqlx::Error, project_id: Uuid, provider_id: Uuid) -> DomainError {
    if is_unique_violation(&e) && constraint(&e) == Some("project_providers_unique") {
        return DomainError::ProjectProviderExists { project_id, provider_id };
    }
    if is_foreign_key_violation(&e) {
        return match constraint(&e) {
            Some("project_providers_project_id_fkey") => DomainError::ProjectNotFound(project_id),
            _ => DomainError::ProviderNotFound(provider_id),
        };
    }
    storage(ErrorCode::ProjectProviderManagementFailed, "writing project provider", e)
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
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl ProjectRepository for PgProjectRepository {
    async fn create(&self, project: &Project) -> Result<Project, DomainError> {
        let row: ProjectRow = sqlx::query_as(
            r#"
            INSERT INTO projects (
                id, organization_id, name, description,
                is_active, metadata, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING
                id, organization_id, name, description,
                is_active, metadata, created_at, updated_at
            "#,
        )
        .bind(project.id)
        .bind(project.organization_id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.is_active)
        .bind(Json(&project.metadata))
        .bind(project.created_at)
        .bind(project.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| project_write_error(e, project, ErrorCode::ProjectCreateFailed))?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, DomainError> {
        let row: Option<ProjectRow> = sqlx::query_as(
            r#"
            SELECT
                id, organization_id, name, description,
                is_active, metadata, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage(ErrorCode::ProjectListFailed, "finding project by id", e))?;

        Ok(row.map(Into::into))
    }

    async fn update(&self, project: &Project) -> Result<Project, DomainError> {
        let row: Option<ProjectRow> = sqlx::query_as(
            r#"
            UPDATE projects
            SET
                name = $2,
                description = $3,
                is_active = $4,
                metadata = $5,
                updated_at = $6
            WHERE id = $1
            RETURNING
                id, organization_id, name, description,
                is_active, metadata, created_at, updated_at
            "#,
        )
        .bind(project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.is_active)
        .bind(Json(&project.metadata))
        .bind(project.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| project_write_error(e, project, ErrorCode::ProjectUpdateFailed))?;

        row.map(Into::into).ok_or(DomainError::ProjectNotFound(project.id))
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage(ErrorCode::ProjectDeleteFailed, "deleting project", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ProjectNotFound(id));
        }
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<(Vec<Project>, u64), DomainError> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM projects");
        push_list_filters(&mut count_qb, query);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage(ErrorCode::ProjectListFailed, "counting projects", e))?;

        let mut qb = QueryBuilder::new(format!("SELECT {} FROM projects", PROJECT_COLUMNS));
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

        let rows: Vec<ProjectRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage(ErrorCode::ProjectListFailed, "listing projects", e))?;

        Ok((rows.into_iter().map(Into::into).collect(), total as u64))
    }

    async fn find_active_by_organization(&self, organization_id: Uuid) -> Result<Vec<Project>, DomainError> {
        let rows: Vec<ProjectRow> = sqlx::query_as(
            r#"
            SELECT
                id, organization_id, name, description,
                is_active, metadata, created_at, updated_at
            FROM projects
            WHERE organization_id = $1 AND is_active
            ORDER BY name
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage(ErrorCode::ProjectListFailed, "listing organization projects", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn search(&self, term: &str, organization_id: Uuid) -> Result<Vec<Project>, DomainError> {
        let rows: Vec<ProjectRow> = sqlx::query_as(
            r#"
            SELECT
                id, organization_id, name, description,
                is_active, metadata, created_at, updated_at
            FROM projects
            WHERE organization_id = $1
              AND is_active
              AND (name ILIKE $2 OR description ILIKE $2)
            ORDER BY name
            "#,
        )
        .bind(organization_id)
        .bind(like_pattern(term))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage(ErrorCode::ProjectSearchFailed, "searching projects", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_provider(&self, provider_id: Uuid) -> Result<Vec<Project>, DomainError> {
        let rows: Vec<ProjectRow> = sqlx::query_as(
            r#"
            SELECT
                p.id, p.organization_id, p.name, p.description,
                p.is_active, p.metadata, p.created_at, p.updated_at
            FROM projects p
            INNER JOIN project_providers pp ON pp.project_id = p.id
            WHERE pp.provider_id = $1 AND pp.is_active AND p.is_active
            ORDER BY p.name
            "#,
        )
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage(ErrorCode::ProjectListFailed, "listing projects by provider", e))?;

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
                SELECT 1 FROM projects
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
        .map_err(|e| storage(ErrorCode::ProjectListFailed, "checking project name", e))
    }

    async fn stats_by_organization(&self, organization_id: Uuid) -> Result<ProjectStats, DomainError> {
        let (total, active): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE is_active) AS active
            FROM projects
            WHERE organization_id = $1
            "#,
        )
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage(ErrorCode::ProjectListFailed, "counting project stats", e))?;

        Ok(ProjectStats::from_counts(total as u64, active as u64))
    }

    async fn add_provider(&self, link: &ProjectProvider) -> Result<ProjectProvider, DomainError> {
        let row: ProjectProviderRow = sqlx::query_as(
            r#"
            INSERT INTO project_providers (
                id, project_id, provider_id, organization_id,
                role, is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING
                id, project_id, provider_id, organization_id,
                role, is_active, created_at, updated_at
            "#,
        )
        .bind(link.id)
        .bind(link.project_id)
        .bind(link.provider_id)
        .bind(link.organization_id)
        .bind(&link.role)
        .bind(link.is_active)
        .bind(link.created_at)
        .bind(link.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| link_write_error(e, link.project_id, link.provider_id))?;

        Ok(row.into())
    }

    async fn remove_provider(&self, project_id: Uuid, provider_id: Uuid) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM project_providers WHERE project_id = $1 AND provider_id = $2")
            .bind(project_id)
            .bind(provider_id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage(ErrorCode::ProjectProviderManagementFailed, "removing project provider", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ProjectProviderNotFound { project_id, provider_id });
        }
        Ok(())
    }

    async fn update_provider_role(
        &self,
        project_id: Uuid,
        provider_id: Uuid,
        role: Option<String>,
    ) -> Result<ProjectProvider, DomainError> {
        let row: Option<ProjectProviderRow> = sqlx::query_as(
            r#"
            UPDATE project_providers
            SET role = $3, updated_at = NOW()
            WHERE project_id = $1 AND provider_id = $2
            RETURNING
                id, project_id, provider_id, organization_id,
                role, is_active, created_at, updated_at
            "#,
        )
        .bind(project_id)
        .bind(provider_id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage(ErrorCode::ProjectProviderManagementFailed, "updating provider role", e))?;

        row.map(Into::into)
            .ok_or(DomainError::ProjectProviderNotFound { project_id, provider_id })
    }

    async fn list_providers(&self, project_id: Uuid) -> Result<Vec<ProjectProviderDetails>, DomainError> {
        let rows: Vec<ProviderDetailsRow> = sqlx::query_as(
            r#"
            SELECT
                pp.provider_id,
                pr.name AS provider_name,
                pp.role,
                pp.is_active,
                pp.created_at AS joined_at
            FROM project_providers pp
            INNER JOIN providers pr ON pr.id = pp.provider_id
            WHERE pp.project_id = $1
            ORDER BY pp.created_at ASC, pp.id
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage(ErrorCode::ProjectProviderManagementFailed, "listing project providers", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn add_providers_bulk(&self, project_id: Uuid, provider_ids: &[Uuid]) -> Result<(), DomainError> {
        let code = ErrorCode::ProjectProviderManagementFailed;

        // Dropping the transaction before commit rolls it back.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage(code, "starting bulk attach", e))?;

        // 1. Project must exist; lock it against concurrent delete. Checked
        //    before the empty-batch shortcut, so an empty list against a
        //    missing project is ProjectNotFound rather than a no-op.
        let organization_id: Uuid = sqlx::query_scalar("SELECT organization_id FROM projects WHERE id = $1 FOR SHARE")
            .bind(project_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| storage(code, "locking project for bulk attach", e))?
            .ok_or(DomainError::ProjectNotFound(project_id))?;

        if provider_ids.is_empty() {
            return Ok(());
        }

        // 2. Every provider must exist
        let found: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM providers WHERE id = ANY($1)")
            .bind(provider_ids)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| storage(code, "checking providers for bulk attach", e))?;
        if let Some(missing) = provider_ids.iter().find(|id| !found.contains(id)) {
            warn!("Bulk attach to project {} references unknown provider {}", project_id, missing);
            return Err(DomainError::ProviderNotFound(*missing));
        }

        // 3. Insert, skipping links that already exist
        let link_ids: Vec<Uuid> = provider_ids.iter().map(|_| Uuid::new_v4()).collect();
        let result = sqlx::query(
            r#"
            INSERT INTO project_providers (
                id, project_id, provider_id, organization_id,
                is_active, created_at, updated_at
            )
            SELECT link_id, $3, provider_id, $4, TRUE, NOW(), NOW()
            FROM UNNEST($1::uuid[], $2::uuid[]) AS t(link_id, provider_id)
            ON CONFLICT (project_id, provider_id) DO NOTHING
            "#,
        )
        .bind(link_ids)
        .bind(provider_ids)
        .bind(project_id)
        .bind(organization_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            // A provider deleted between the check and the insert.
            if is_foreign_key_violation(&e) && constraint(&e) == Some("project_providers_provider_id_fkey") {
                return DomainError::validation(
                    ErrorDomain::Projects,
                    "provider_ids",
                    "references a provider that no longer exists",
                );
            }
            storage(code, "bulk attaching providers", e)
        })?;

        tx.commit()
            .await
            .map_err(|e| storage(code, "committing bulk attach", e))?;

        info!(
            "Bulk attach to project {}: {} inserted, {} already linked",
            project_id,
            result.rows_affected(),
            (provider_ids.len() as u64).saturating_sub(result.rows_affected())
        );
        Ok(())
    }

    async fn remove_providers_bulk(&self, project_id: Uuid, provider_ids: &[Uuid]) -> Result<(), DomainError> {
        if provider_ids.is_empty() {
            return Ok(());
        }

        sqlx::query("DELETE FROM project_providers WHERE project_id = $1 AND provider_id = ANY($2)")
            .bind(project_id)
            .bind(provider_ids)
            .execute(&self.pool)
            .await
            .map_err(|e| storage(ErrorCode::ProjectProviderManagementFailed, "bulk removing providers", e))?;

        Ok(())
    }
}
