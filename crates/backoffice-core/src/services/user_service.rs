//! User use cases

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use backoffice_shared::constants::DEFAULT_PAGE_SIZE;
use backoffice_shared::utils::mask_email;

use crate::domain::{User, UserProfile};
use crate::dto::{
    CreateUserProfileRequest, CreateUserRequest, SetPhoneRequest, UpdateProfilePictureRequest,
    UpdateUserProfileRequest, UpdateUserRequest, UserListParams,
};
use crate::error::{DomainError, ErrorDomain};
use crate::repositories::{UserProfileRepository, UserRepository};

pub struct UserService<R: UserRepository + ?Sized> {
    repo: Arc<R>,
    profiles: Arc<dyn UserProfileRepository>,
}

impl<R: UserRepository + ?Sized> UserService<R> {
    pub fn new(repo: Arc<R>, profiles: Arc<dyn UserProfileRepository>) -> Self {
        Self { repo, profiles }
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        validate(&request)?;

        let user = User::new(&request.email, &request.name);
        if self.repo.find_by_email(&user.email).await?.is_some() {
            warn!("Registration refused, email exists: {}", mask_email(&user.email));
            return Err(DomainError::EmailAlreadyExists(user.email));
        }

        let created = self.repo.create(&user).await?;
        info!("User created: {}", created.id);
        Ok(created)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.repo.find_by_id(id).await?.ok_or(DomainError::UserNotFound(id))
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<User, DomainError> {
        let email = email.trim().to_lowercase();
        self.repo
            .find_by_email(&email)
            .await?
            .ok_or(DomainError::UserNotFoundByEmail(email))
    }

    pub async fn update_user(&self, id: Uuid, request: UpdateUserRequest) -> Result<User, DomainError> {
        validate(&request)?;

        let mut user = self.get_user(id).await?;
        if let Some(name) = request.name {
            user.rename(&name);
        }
        self.repo.update(&user).await
    }

    pub async fn activate_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.set_active(id, true).await
    }

    pub async fn deactivate_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.set_active(id, false).await
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<User, DomainError> {
        let mut user = self.get_user(id).await?;
        user.set_active(active);
        let updated = self.repo.update(&user).await?;
        info!("User {} active={}", id, active);
        Ok(updated)
    }

    pub async fn list_users(&self, params: UserListParams) -> Result<Vec<User>, DomainError> {
        validate(&params)?;
        self.repo
            .list(params.limit.unwrap_or(DEFAULT_PAGE_SIZE), params.offset.unwrap_or(0))
            .await
    }

    /// One profile per user; the user must exist.
    pub async fn create_user_profile(
        &self,
        user_id: Uuid,
        request: CreateUserProfileRequest,
    ) -> Result<UserProfile, DomainError> {
        validate(&request)?;

        self.get_user(user_id).await?;
        if self.profiles.find_by_user_id(user_id).await?.is_some() {
            warn!("Profile for user {} already exists", user_id);
            return Err(DomainError::ProfileAlreadyExists(user_id));
        }

        let profile = UserProfile::new(user_id, &request.first_name, &request.last_name);
        let created = self.profiles.create(&profile).await?;
        info!("Profile created for user {}", user_id);
        Ok(created)
    }

    pub async fn get_user_profile(&self, user_id: Uuid) -> Result<UserProfile, DomainError> {
        self.profiles
            .find_by_user_id(user_id)
            .await?
            .ok_or(DomainError::ProfileNotFound(user_id))
    }

    pub async fn update_user_profile(
        &self,
        user_id: Uuid,
        request: UpdateUserProfileRequest,
    ) -> Result<UserProfile, DomainError> {
        validate(&request)?;

        let mut profile = self.get_user_profile(user_id).await?;
        if let Some(first_name) = request.first_name {
            profile.set_first_name(&first_name);
        }
        if let Some(last_name) = request.last_name {
            profile.set_last_name(&last_name);
        }
        if let Some(bio) = request.bio {
            profile.set_bio(&bio);
        }
        self.profiles.update(&profile).await
    }

    pub async fn update_profile_picture(
        &self,
        user_id: Uuid,
        request: UpdateProfilePictureRequest,
    ) -> Result<UserProfile, DomainError> {
        validate(&request)?;

        let mut profile = self.get_user_profile(user_id).await?;
        profile.set_profile_picture(&request.picture_url);
        self.profiles.update(&profile).await
    }

    pub async fn set_user_phone(&self, user_id: Uuid, request: SetPhoneRequest) -> Result<UserProfile, DomainError> {
        validate(&request)?;

        let mut profile = self.get_user_profile(user_id).await?;
        profile.set_phone(&request.phone);
        self.profiles.update(&profile).await
    }
}

fn validate<T: Validate>(request: &T) -> Result<(), DomainError> {
    request
        .validate()
        .map_err(|e| DomainError::from_validation_errors(ErrorDomain::Users, &e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::repositories::{MockUserProfileRepository, MockUserRepository};
    use mockall::predicate::*;

    fn service(repo: MockUserRepository, profiles: MockUserProfileRepository) -> UserService<MockUserRepository> {
        UserService::new(Arc::new(repo), Arc::new(profiles))
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .with(eq("jane@example.com"))
            .returning(|email| Ok(Some(User::new(email, "Jane"))));
        repo.expect_create().never();

        let service = service(repo, MockUserProfileRepository::new());
        let err = service
            .create_user(CreateUserRequest {
                email: "Jane@Example.com".into(),
                name: "Jane".into(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::UserEmailExists);
    }

    #[tokio::test]
    async fn test_deactivate_user() {
        let user = User::new("jane@example.com", "Jane");
        let id = user.id;
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(Some(user.clone())));
        repo.expect_update().returning(|u| Ok(u.clone()));

        let service = service(repo, MockUserProfileRepository::new());
        let updated = service.deactivate_user(id).await.unwrap();
        assert!(!updated.is_active);
    }

    #[tokio::test]
    async fn test_unknown_email_is_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));

        let service = service(repo, MockUserProfileRepository::new());
        let err = service.get_user_by_email("ghost@example.com").await.unwrap_err();
        assert_eq!(err.code().full_code(), "USERS.NOT_FOUND");
    }

    #[tokio::test]
    async fn test_second_profile_rejected() {
        let user = User::new("jane@example.com", "Jane");
        let id = user.id;
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(Some(user.clone())));
        let mut profiles = MockUserProfileRepository::new();
        profiles
            .expect_find_by_user_id()
            .with(eq(id))
            .returning(|uid| Ok(Some(UserProfile::new(uid, "Jane", "Doe"))));
        profiles.expect_create().never();

        let err = service(repo, profiles)
            .create_user_profile(
                id,
                CreateUserProfileRequest {
                    first_name: "Jane".into(),
                    last_name: "Doe".into(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code().full_code(), "USERS.PROFILE_EXISTS");
    }

    #[tokio::test]
    async fn test_profile_for_unknown_user_rejected() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        let mut profiles = MockUserProfileRepository::new();
        profiles.expect_create().never();

        let err = service(repo, profiles)
            .create_user_profile(
                Uuid::new_v4(),
                CreateUserProfileRequest {
                    first_name: "Jane".into(),
                    last_name: "Doe".into(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::UserNotFound);
    }

    #[tokio::test]
    async fn test_missing_profile_is_not_found() {
        let mut profiles = MockUserProfileRepository::new();
        profiles.expect_find_by_user_id().returning(|_| Ok(None));
        profiles.expect_update().never();

        let err = service(MockUserRepository::new(), profiles)
            .set_user_phone(Uuid::new_v4(), SetPhoneRequest { phone: "+62 812 3456 7890".into() })
            .await
            .unwrap_err();
        assert_eq!(err.code().full_code(), "USERS.PROFILE_NOT_FOUND");
        assert_eq!(err.code().status(), 404);
    }

    #[tokio::test]
    async fn test_partial_profile_update_keeps_other_fields() {
        let mut existing = UserProfile::new(Uuid::new_v4(), "Jane", "Doe");
        existing.set_phone("021 555 0199");
        let id = existing.user_id;

        let mut profiles = MockUserProfileRepository::new();
        profiles.expect_find_by_user_id().returning(move |_| Ok(Some(existing.clone())));
        profiles
            .expect_update()
            .times(1)
            .returning(|p| Ok(p.clone()));

        let updated = service(MockUserRepository::new(), profiles)
            .update_user_profile(
                id,
                UpdateUserProfileRequest {
                    last_name: Some("Smith".into()),
                    bio: Some("Builds things".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.first_name, "Jane");
        assert_eq!(updated.last_name, "Smith");
        assert_eq!(updated.bio.as_deref(), Some("Builds things"));
        assert_eq!(updated.phone.as_deref(), Some("021 555 0199"));
    }
}
