use std::sync::Arc;

use chrono::Duration;

use backoffice_core::repositories::{
    InvitationRepository, MembershipRepository, OrganizationRepository, ProjectRepository,
    ProviderRepository, UserProfileRepository, UserRepository,
};
use backoffice_core::services::{OrganizationService, ProjectService, ProviderService, UserService};

/// Storage ports the services are built from; one backend per process.
#[derive(Clone)]
pub struct Repositories {
    pub projects: Arc<dyn ProjectRepository>,
    pub providers: Arc<dyn ProviderRepository>,
    pub organizations: Arc<dyn OrganizationRepository>,
    pub memberships: Arc<dyn MembershipRepository>,
    pub invitations: Arc<dyn InvitationRepository>,
    pub users: Arc<dyn UserRepository>,
    pub user_profiles: Arc<dyn UserProfileRepository>,
}

#[derive(Clone)]
pub struct AppState {
    pub projects: Arc<ProjectService<dyn ProjectRepository>>,
    pub providers: Arc<ProviderService<dyn ProviderRepository>>,
    pub organizations: Arc<OrganizationService>,
    pub users: Arc<UserService<dyn UserRepository>>,
}

impl AppState {
    pub fn new(repos: Repositories, invitation_ttl: Duration) -> Self {
        Self {
            projects: Arc::new(ProjectService::new(repos.projects)),
            providers: Arc::new(ProviderService::new(repos.providers)),
            organizations: Arc::new(OrganizationService::new(
                repos.organizations,
                repos.memberships,
                repos.invitations,
                invitation_ttl,
            )),
            users: Arc::new(UserService::new(repos.users, repos.user_profiles)),
        }
    }
}
