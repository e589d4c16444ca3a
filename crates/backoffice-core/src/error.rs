// ============================================================================
// Back-office Core - Domain Errors
// File: crates/backoffice-core/src/error.rs
// Description: Error taxonomy and the immutable code table per domain
// ============================================================================

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

/// Functional area an error code belongs to. Prefixes the wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorDomain {
    Projects,
    Providers,
    Organizations,
    Users,
}

impl ErrorDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorDomain::Projects => "PROJECTS",
            ErrorDomain::Providers => "PROVIDERS",
            ErrorDomain::Organizations => "ORGANIZATIONS",
            ErrorDomain::Users => "USERS",
        }
    }

    pub fn validation_code(&self) -> ErrorCode {
        match self {
            ErrorDomain::Projects => ErrorCode::ProjectValidationFailed,
            ErrorDomain::Providers => ErrorCode::ProviderValidationFailed,
            ErrorDomain::Organizations => ErrorCode::OrganizationValidationFailed,
            ErrorDomain::Users => ErrorCode::UserValidationFailed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Validation,
    Business,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorDescriptor {
    pub domain: ErrorDomain,
    pub code: &'static str,
    pub kind: ErrorKind,
    pub status: u16,
    pub message: &'static str,
}

const fn entry(
    domain: ErrorDomain,
    code: &'static str,
    kind: ErrorKind,
    status: u16,
    message: &'static str,
) -> ErrorDescriptor {
    ErrorDescriptor { domain, code, kind, status, message }
}

/// Every error code the back office can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ProjectNotFound,
    ProjectNameExists,
    ProjectCreateFailed,
    ProjectUpdateFailed,
    ProjectDeleteFailed,
    ProjectListFailed,
    ProjectSearchFailed,
    ProjectValidationFailed,
    ProjectCannotDelete,
    ProjectInactive,
    ProjectProviderNotFound,
    ProjectProviderExists,
    ProjectProviderManagementFailed,

    ProviderNotFound,
    ProviderNameExists,
    ProviderCreateFailed,
    ProviderUpdateFailed,
    ProviderDeleteFailed,
    ProviderListFailed,
    ProviderSearchFailed,
    ProviderValidationFailed,
    ProviderCannotDelete,
    ProviderInactive,

    OrganizationNotFound,
    OrganizationValidationFailed,
    MemberNotFound,
    MemberExists,
    InvitationNotFound,
    InvitationUsed,
    InvitationExpired,
    PermissionDenied,
    CannotRemoveOwner,
    OrganizationOperationFailed,

    UserNotFound,
    UserEmailExists,
    UserProfileNotFound,
    UserProfileExists,
    UserValidationFailed,
    UserOperationFailed,
}

impl ErrorCode {
    pub const fn descriptor(self) -> ErrorDescriptor {
        use ErrorDomain::*;
        use ErrorKind::*;

        match self {
            ErrorCode::ProjectNotFound => entry(Projects, "NOT_FOUND", NotFound, 404, "Project not found"),
            ErrorCode::ProjectNameExists => entry(Projects, "NAME_EXISTS", Conflict, 409, "Project name already exists in this organization"),
            ErrorCode::ProjectCreateFailed => entry(Projects, "CREATE_FAILED", Internal, 500, "Failed to create project"),
            ErrorCode::ProjectUpdateFailed => entry(Projects, "UPDATE_FAILED", Internal, 500, "Failed to update project"),
            ErrorCode::ProjectDeleteFailed => entry(Projects, "DELETE_FAILED", Internal, 500, "Failed to delete project"),
            ErrorCode::ProjectListFailed => entry(Projects, "LIST_FAILED", Internal, 500, "Failed to list projects"),
            ErrorCode::ProjectSearchFailed => entry(Projects, "SEARCH_FAILED", Internal, 500, "Failed to search projects"),
            ErrorCode::ProjectValidationFailed => entry(Projects, "VALIDATION_FAILED", Validation, 400, "Invalid project data"),
            ErrorCode::ProjectCannotDelete => entry(Projects, "CANNOT_DELETE", Business, 409, "Project cannot be deleted"),
            ErrorCode::ProjectInactive => entry(Projects, "INACTIVE", Business, 409, "Project is inactive"),
            ErrorCode::ProjectProviderNotFound => entry(Projects, "PROVIDER_NOT_FOUND", NotFound, 404, "Project provider relationship not found"),
            ErrorCode::ProjectProviderExists => entry(Projects, "PROVIDER_EXISTS", Conflict, 409, "Provider is already associated with this project"),
            ErrorCode::ProjectProviderManagementFailed => entry(Projects, "PROVIDER_MANAGEMENT_FAILED", Internal, 500, "Failed to manage project providers"),

            ErrorCode::ProviderNotFound => entry(Providers, "NOT_FOUND", NotFound, 404, "Provider not found"),
            ErrorCode::ProviderNameExists => entry(Providers, "NAME_EXISTS", Conflict, 409, "Provider name already exists in this organization"),
            ErrorCode::ProviderCreateFailed => entry(Providers, "CREATE_FAILED", Internal, 500, "Failed to create provider"),
            ErrorCode::ProviderUpdateFailed => entry(Providers, "UPDATE_FAILED", Internal, 500, "Failed to update provider"),
            ErrorCode::ProviderDeleteFailed => entry(Providers, "DELETE_FAILED", Internal, 500, "Failed to delete provider"),
            ErrorCode::ProviderListFailed => entry(Providers, "LIST_FAILED", Internal, 500, "Failed to list providers"),
            ErrorCode::ProviderSearchFailed => entry(Providers, "SEARCH_FAILED", Internal, 500, "Failed to search providers"),
            ErrorCode::ProviderValidationFailed => entry(Providers, "VALIDATION_FAILED", Validation, 400, "Invalid provider data"),
            ErrorCode::ProviderCannotDelete => entry(Providers, "CANNOT_DELETE", Business, 409, "Provider cannot be deleted"),
            ErrorCode::ProviderInactive => entry(Providers, "INACTIVE", Business, 409, "Provider is inactive"),

            ErrorCode::OrganizationNotFound => entry(Organizations, "NOT_FOUND", NotFound, 404, "Organization not found"),
            ErrorCode::OrganizationValidationFailed => entry(Organizations, "VALIDATION_FAILED", Validation, 400, "Invalid organization data"),
            ErrorCode::MemberNotFound => entry(Organizations, "MEMBER_NOT_FOUND", NotFound, 404, "Membership not found"),
            ErrorCode::MemberExists => entry(Organizations, "MEMBER_EXISTS", Conflict, 409, "User is already a member of this organization"),
            ErrorCode::InvitationNotFound => entry(Organizations, "INVITATION_NOT_FOUND", NotFound, 404, "Invitation not found"),
            ErrorCode::InvitationUsed => entry(Organizations, "INVITATION_USED", Business, 409, "Invitation has already been used"),
            ErrorCode::InvitationExpired => entry(Organizations, "INVITATION_EXPIRED", Business, 410, "Invitation has expired"),
            ErrorCode::PermissionDenied => entry(Organizations, "PERMISSION_DENIED", Business, 403, "Insufficient permissions"),
            ErrorCode::CannotRemoveOwner => entry(Organizations, "CANNOT_REMOVE_OWNER", Business, 409, "The organization owner cannot be removed"),
            ErrorCode::OrganizationOperationFailed => entry(Organizations, "OPERATION_FAILED", Internal, 500, "Organization operation failed"),

            ErrorCode::UserNotFound => entry(Users, "NOT_FOUND", NotFound, 404, "User not found"),
            ErrorCode::UserEmailExists => entry(Users, "EMAIL_EXISTS", Conflict, 409, "Email address is already registered"),
            ErrorCode::UserProfileNotFound => entry(Users, "PROFILE_NOT_FOUND", NotFound, 404, "User profile not found"),
            ErrorCode::UserProfileExists => entry(Users, "PROFILE_EXISTS", Conflict, 409, "User profile already exists"),
            ErrorCode::UserValidationFailed => entry(Users, "VALIDATION_FAILED", Validation, 400, "Invalid user data"),
            ErrorCode::UserOperationFailed => entry(Users, "OPERATION_FAILED", Internal, 500, "User operation failed"),
        }
    }

    /// Wire form, e.g. `PROJECTS.NAME_EXISTS`.
    pub fn full_code(&self) -> String {
        let d = self.descriptor();
        format!("{}.{}", d.domain.as_str(), d.code)
    }

    pub fn status(&self) -> u16 {
        self.descriptor().status
    }

    pub fn kind(&self) -> ErrorKind {
        self.descriptor().kind
    }

    pub fn message(&self) -> &'static str {
        self.descriptor().message
    }
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Project not found: {0}")]
    ProjectNotFound(Uuid),

    #[error("Project name '{name}' already exists in organization {organization_id}")]
    ProjectNameExists { name: String, organization_id: Uuid },

    #[error("Project {0} is inactive")]
    ProjectInactive(Uuid),

    #[error("Provider {provider_id} is not linked to project {project_id}")]
    ProjectProviderNotFound { project_id: Uuid, provider_id: Uuid },

    #[error("Provider {provider_id} is already linked to project {project_id}")]
    ProjectProviderExists { project_id: Uuid, provider_id: Uuid },

    #[error("Provider not found: {0}")]
    ProviderNotFound(Uuid),

    #[error("Provider name '{name}' already exists in organization {organization_id}")]
    ProviderNameExists { name: String, organization_id: Uuid },

    #[error("Provider {0} is inactive")]
    ProviderInactive(Uuid),

    #[error("Organization not found: {0}")]
    OrganizationNotFound(Uuid),

    #[error("User {user_id} has no active membership in organization {organization_id}")]
    MembershipNotFound { user_id: Uuid, organization_id: Uuid },

    #[error("User {user_id} is already a member of organization {organization_id}")]
    MembershipAlreadyExists { user_id: Uuid, organization_id: Uuid },

    #[error("Invitation not found")]
    InvitationNotFound,

    #[error("Invitation already used")]
    InvitationAlreadyUsed,

    #[error("Invitation expired")]
    InvitationExpired,

    #[error("User {user_id} lacks permission {permission}")]
    PermissionDenied { user_id: Uuid, permission: String },

    #[error("Organization owner cannot be removed")]
    CannotRemoveOwner,

    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("User not found: {0}")]
    UserNotFoundByEmail(String),

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Profile not found for user {0}")]
    ProfileNotFound(Uuid),

    #[error("Profile already exists for user {0}")]
    ProfileAlreadyExists(Uuid),

    #[error("Validation failed on {field}: {reason}")]
    Validation {
        domain: ErrorDomain,
        field: String,
        reason: String,
    },

    /// Unexpected persistence failure. `cause` is for logs only.
    #[error("{code:?}: {cause}")]
    Storage { code: ErrorCode, cause: String },
}

impl DomainError {
    pub fn validation(domain: ErrorDomain, field: impl Into<String>, reason: impl Into<String>) -> Self {
        DomainError::Validation {
            domain,
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn storage(code: ErrorCode, cause: impl std::fmt::Display) -> Self {
        DomainError::Storage {
            code,
            cause: cause.to_string(),
        }
    }

    /// Collapses `validator` output into a single deterministic field error.
    pub fn from_validation_errors(domain: ErrorDomain, errors: &ValidationErrors) -> Self {
        let mut fields: Vec<(String, String)> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let reason = errs
                    .first()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => e.code.to_string(),
                    })
                    .unwrap_or_else(|| "invalid".to_string());
                (field.to_string(), reason)
            })
            .collect();
        fields.sort();

        match fields.into_iter().next() {
            Some((field, reason)) => DomainError::validation(domain, field, reason),
            None => DomainError::validation(domain, "request", "invalid"),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::ProjectNotFound(_) => ErrorCode::ProjectNotFound,
            DomainError::ProjectNameExists { .. } => ErrorCode::ProjectNameExists,
            DomainError::ProjectInactive(_) => ErrorCode::ProjectInactive,
            DomainError::ProjectProviderNotFound { .. } => ErrorCode::ProjectProviderNotFound,
            DomainError::ProjectProviderExists { .. } => ErrorCode::ProjectProviderExists,
            DomainError::ProviderNotFound(_) => ErrorCode::ProviderNotFound,
            DomainError::ProviderNameExists { .. } => ErrorCode::ProviderNameExists,
            DomainError::ProviderInactive(_) => ErrorCode::ProviderInactive,
            DomainError::OrganizationNotFound(_) => ErrorCode::OrganizationNotFound,
            DomainError::MembershipNotFound { .. } => ErrorCode::MemberNotFound,
            DomainError::MembershipAlreadyExists { .. } => ErrorCode::MemberExists,
            DomainError::InvitationNotFound => ErrorCode::InvitationNotFound,
            DomainError::InvitationAlreadyUsed => ErrorCode::InvitationUsed,
            DomainError::InvitationExpired => ErrorCode::InvitationExpired,
            DomainError::PermissionDenied { .. } => ErrorCode::PermissionDenied,
            DomainError::CannotRemoveOwner => ErrorCode::CannotRemoveOwner,
            DomainError::UserNotFound(_) | DomainError::UserNotFoundByEmail(_) => ErrorCode::UserNotFound,
            DomainError::EmailAlreadyExists(_) => ErrorCode::UserEmailExists,
            DomainError::ProfileNotFound(_) => ErrorCode::UserProfileNotFound,
            DomainError::ProfileAlreadyExists(_) => ErrorCode::UserProfileExists,
            DomainError::Validation { domain, .. } => domain.validation_code(),
            DomainError::Storage { code, .. } => *code,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.code().kind()
    }

    /// Structured detail fields safe to show to a client.
    pub fn details(&self) -> Option<Map<String, Value>> {
        let mut map = Map::new();
        match self {
            DomainError::ProjectNotFound(id)
            | DomainError::ProjectInactive(id)
            | DomainError::ProviderNotFound(id)
            | DomainError::ProviderInactive(id)
            | DomainError::OrganizationNotFound(id)
            | DomainError::UserNotFound(id) => {
                map.insert("id".into(), Value::String(id.to_string()));
            }
            DomainError::ProjectNameExists { name, organization_id }
            | DomainError::ProviderNameExists { name, organization_id } => {
                map.insert("name".into(), Value::String(name.clone()));
                map.insert("organization_id".into(), Value::String(organization_id.to_string()));
            }
            DomainError::ProjectProviderNotFound { project_id, provider_id }
            | DomainError::ProjectProviderExists { project_id, provider_id } => {
                map.insert("project_id".into(), Value::String(project_id.to_string()));
                map.insert("provider_id".into(), Value::String(provider_id.to_string()));
            }
            DomainError::MembershipNotFound { user_id, organization_id }
            | DomainError::MembershipAlreadyExists { user_id, organization_id } => {
                map.insert("user_id".into(), Value::String(user_id.to_string()));
                map.insert("organization_id".into(), Value::String(organization_id.to_string()));
            }
            DomainError::ProfileNotFound(user_id) | DomainError::ProfileAlreadyExists(user_id) => {
                map.insert("user_id".into(), Value::String(user_id.to_string()));
            }
            DomainError::PermissionDenied { user_id, permission } => {
                map.insert("user_id".into(), Value::String(user_id.to_string()));
                map.insert("permission".into(), Value::String(permission.clone()));
            }
            DomainError::UserNotFoundByEmail(email) | DomainError::EmailAlreadyExists(email) => {
                map.insert("email".into(), Value::String(email.clone()));
            }
            DomainError::Validation { field, reason, .. } => {
                map.insert("field".into(), Value::String(field.clone()));
                map.insert("reason".into(), Value::String(reason.clone()));
            }
            DomainError::InvitationNotFound
            | DomainError::InvitationAlreadyUsed
            | DomainError::InvitationExpired
            | DomainError::CannotRemoveOwner
            | DomainError::Storage { .. } => return None,
        }
        Some(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_code_is_domain_prefixed() {
        assert_eq!(ErrorCode::ProjectNameExists.full_code(), "PROJECTS.NAME_EXISTS");
        assert_eq!(ErrorCode::ProjectProviderNotFound.full_code(), "PROJECTS.PROVIDER_NOT_FOUND");
        assert_eq!(ErrorCode::UserEmailExists.full_code(), "USERS.EMAIL_EXISTS");
    }

    #[test]
    fn test_status_follows_kind() {
        assert_eq!(ErrorCode::ProjectNotFound.status(), 404);
        assert_eq!(ErrorCode::ProviderNameExists.status(), 409);
        assert_eq!(ErrorCode::ProjectValidationFailed.status(), 400);
        assert_eq!(ErrorCode::ProjectListFailed.status(), 500);
        assert_eq!(ErrorCode::ProjectInactive.kind(), ErrorKind::Business);
    }

    #[test]
    fn test_storage_cause_not_in_details() {
        let err = DomainError::storage(ErrorCode::ProjectCreateFailed, "connection reset by peer");
        assert_eq!(err.code(), ErrorCode::ProjectCreateFailed);
        assert!(err.details().is_none());
        assert!(!err.code().message().contains("connection"));
    }

    #[test]
    fn test_name_exists_details() {
        let org = Uuid::new_v4();
        let err = DomainError::ProjectNameExists { name: "Alpha".into(), organization_id: org };
        let details = err.details().unwrap();
        assert_eq!(details["name"], "Alpha");
        assert_eq!(details["organization_id"], org.to_string());
    }

    #[test]
    fn test_validation_code_per_domain() {
        let err = DomainError::validation(ErrorDomain::Providers, "name", "too long");
        assert_eq!(err.code().full_code(), "PROVIDERS.VALIDATION_FAILED");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
