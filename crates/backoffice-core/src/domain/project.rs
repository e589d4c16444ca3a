// ============================================================================
// Back-office Core - Project Entity
// File: crates/backoffice-core/src/domain/project.rs
// Description: Projects and their provider links
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Metadata;

/// Project entity, unique by `(organization_id, name)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(
        organization_id: Uuid,
        name: &str,
        description: Option<String>,
        metadata: Metadata,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            organization_id,
            name: name.trim().to_string(),
            description: description.map(|d| d.trim().to_string()),
            is_active: true,
            metadata,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn rename(&mut self, name: &str) {
        self.name = name.trim().to_string();
        self.touch();
    }

    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Join row between a project and a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectProvider {
    pub id: Uuid,
    pub project_id: Uuid,
    pub provider_id: Uuid,
    /// Copied from the project at link time.
    pub organization_id: Uuid,
    pub role: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectProvider {
    pub fn new(project: &Project, provider_id: Uuid, role: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project_id: project.id,
            provider_id,
            organization_id: project.organization_id,
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A link as listed under a project, with the provider's name joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectProviderDetails {
    pub provider_id: Uuid,
    pub provider_name: String,
    pub role: Option<String>,
    pub is_active: bool,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectWithProviders {
    #[serde(flatten)]
    pub project: Project,
    pub providers: Vec<ProjectProviderDetails>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStats {
    pub total_projects: u64,
    pub active_projects: u64,
    pub inactive_projects: u64,
}

impl ProjectStats {
    /// `active` must come from a filtered count over the same row set as `total`.
    pub fn from_counts(total: u64, active: u64) -> Self {
        Self {
            total_projects: total,
            active_projects: active,
            inactive_projects: total.saturating_sub(active),
        }
    }
}
