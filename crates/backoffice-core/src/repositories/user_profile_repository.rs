//! User profile repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::UserProfile;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileRepository: Send + Sync {
    /// Fails `UserNotFound` for an unknown user and `ProfileAlreadyExists`
    /// when the user already has one.
    async fn create(&self, profile: &UserProfile) -> Result<UserProfile, DomainError>;
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<UserProfile>, DomainError>;
    async fn update(&self, profile: &UserProfile) -> Result<UserProfile, DomainError>;
}
