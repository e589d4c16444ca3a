//! In-memory user repository

use async_trait::async_trait;
use uuid::Uuid;

use backoffice_core::domain::User;
use backoffice_core::error::DomainError;
use backoffice_core::repositories::UserRepository;

use super::MemoryStore;

pub struct MemoryUserRepository {
    store: MemoryStore,
}

impl MemoryUserRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &User) -> Result<User, DomainError> {
        let mut tables = self.store.lock();
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(DomainError::EmailAlreadyExists(user.email.clone()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.store.lock().users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .store
            .lock()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut tables = self.store.lock();
        if !tables.users.contains_key(&user.id) {
            return Err(DomainError::UserNotFound(user.id));
        }
        if tables.users.values().any(|u| u.email == user.email && u.id != user.id) {
            return Err(DomainError::EmailAlreadyExists(user.email.clone()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<User>, DomainError> {
        let tables = self.store.lock();
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(users
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}
