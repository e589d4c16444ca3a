//! Repository traits (ports)

pub mod invitation_repository;
pub mod membership_repository;
pub mod organization_repository;
pub mod project_repository;
pub mod provider_repository;
pub mod user_profile_repository;
pub mod user_repository;

pub use invitation_repository::InvitationRepository;
pub use membership_repository::MembershipRepository;
pub use organization_repository::OrganizationRepository;
pub use project_repository::ProjectRepository;
pub use provider_repository::ProviderRepository;
pub use user_profile_repository::UserProfileRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use invitation_repository::MockInvitationRepository;
#[cfg(test)]
pub use membership_repository::MockMembershipRepository;
#[cfg(test)]
pub use organization_repository::MockOrganizationRepository;
#[cfg(test)]
pub use project_repository::MockProjectRepository;
#[cfg(test)]
pub use provider_repository::MockProviderRepository;
#[cfg(test)]
pub use user_profile_repository::MockUserProfileRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
