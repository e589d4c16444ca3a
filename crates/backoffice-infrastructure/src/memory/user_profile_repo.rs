//! In-memory user profile repository

use async_trait::async_trait;
use uuid::Uuid;

use backoffice_core::domain::UserProfile;
use backoffice_core::error::DomainError;
use backoffice_core::repositories::UserProfileRepository;

use super::MemoryStore;

pub struct MemoryUserProfileRepository {
    store: MemoryStore,
}

impl MemoryUserProfileRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserProfileRepository for MemoryUserProfileRepository {
    async fn create(&self, profile: &UserProfile) -> Result<UserProfile, DomainError> {
        let mut tables = self.store.lock();
        if !tables.users.contains_key(&profile.user_id) {
            return Err(DomainError::UserNotFound(profile.user_id));
        }
        if tables.user_profiles.contains_key(&profile.user_id) {
            return Err(DomainError::ProfileAlreadyExists(profile.user_id));
        }
        tables.user_profiles.insert(profile.user_id, profile.clone());
        Ok(profile.clone())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<UserProfile>, DomainError> {
        Ok(self.store.lock().user_profiles.get(&user_id).cloned())
    }

    async fn update(&self, profile: &UserProfile) -> Result<UserProfile, DomainError> {
        let mut tables = self.store.lock();
        let stored = tables
            .user_profiles
            .get_mut(&profile.user_id)
            .ok_or(DomainError::ProfileNotFound(profile.user_id))?;

        // created_at is fixed at insert.
        *stored = UserProfile {
            created_at: stored.created_at,
            ..profile.clone()
        };
        Ok(stored.clone())
    }
}
