//! PostgreSQL repository implementations

mod errors;

pub mod invitation_repo_impl;
pub mod membership_repo_impl;
pub mod organization_repo_impl;
pub mod project_repo_impl;
pub mod provider_repo_impl;
pub mod user_profile_repo_impl;
pub mod user_repo_impl;

pub use invitation_repo_impl::PgInvitationRepository;
pub use membership_repo_impl::PgMembershipRepository;
pub use organization_repo_impl::PgOrganizationRepository;
pub use project_repo_impl::PgProjectRepository;
pub use provider_repo_impl::PgProviderRepository;
pub use user_profile_repo_impl::PgUserProfileRepository;
pub use user_repo_impl::PgUserRepository;
