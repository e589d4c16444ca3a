//! In-memory storage backend
//!
//! All repositories built from one [`MemoryStore`] share a single table set
//! behind a mutex and enforce the same uniqueness, foreign-key and cascade
//! rules as the PostgreSQL schema. Locks are never held across an await.

mod organization_repo;
mod project_repo;
mod provider_repo;
mod user_profile_repo;
mod user_repo;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use uuid::Uuid;

use backoffice_core::domain::{
    Invitation, Membership, Organization, Project, ProjectProvider, Provider, User, UserProfile,
};

pub use organization_repo::{
    MemoryInvitationRepository, MemoryMembershipRepository, MemoryOrganizationRepository,
};
pub use project_repo::MemoryProjectRepository;
pub use provider_repo::MemoryProviderRepository;
pub use user_profile_repo::MemoryUserProfileRepository;
pub use user_repo::MemoryUserRepository;

#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub users: HashMap<Uuid, User>,
    /// Keyed by user id.
    pub user_profiles: HashMap<Uuid, UserProfile>,
    pub organizations: HashMap<Uuid, Organization>,
    pub memberships: HashMap<Uuid, Membership>,
    pub invitations: HashMap<Uuid, Invitation>,
    pub providers: HashMap<Uuid, Provider>,
    pub projects: HashMap<Uuid, Project>,
    /// Insertion ordered, unique by `(project_id, provider_id)`.
    pub project_providers: Vec<ProjectProvider>,
}

impl Tables {
    pub fn link_position(&self, project_id: Uuid, provider_id: Uuid) -> Option<usize> {
        self.project_providers
            .iter()
            .position(|l| l.project_id == project_id && l.provider_id == provider_id)
    }
}

/// Shared handle to the in-memory tables. Cloning is cheap.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock()
    }

    pub fn projects(&self) -> MemoryProjectRepository {
        MemoryProjectRepository::new(self.clone())
    }

    pub fn providers(&self) -> MemoryProviderRepository {
        MemoryProviderRepository::new(self.clone())
    }

    pub fn organizations(&self) -> MemoryOrganizationRepository {
        MemoryOrganizationRepository::new(self.clone())
    }

    pub fn memberships(&self) -> MemoryMembershipRepository {
        MemoryMembershipRepository::new(self.clone())
    }

    pub fn invitations(&self) -> MemoryInvitationRepository {
        MemoryInvitationRepository::new(self.clone())
    }

    pub fn users(&self) -> MemoryUserRepository {
        MemoryUserRepository::new(self.clone())
    }

    pub fn user_profiles(&self) -> MemoryUserProfileRepository {
        MemoryUserProfileRepository::new(self.clone())
    }
}
