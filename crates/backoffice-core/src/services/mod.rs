//! Application services

pub mod organization_service;
pub mod project_service;
pub mod provider_service;
pub mod user_service;

pub use organization_service::OrganizationService;
pub use project_service::ProjectService;
pub use provider_service::ProviderService;
pub use user_service::UserService;
