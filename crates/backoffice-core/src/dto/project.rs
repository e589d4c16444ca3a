//! Project request DTOs

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::common::{entity_name, not_nil};
use crate::domain::Metadata;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(custom(function = "not_nil"))]
    pub organization_id: Uuid,

    #[validate(custom(function = "entity_name"))]
    pub name: String,

    #[validate(length(max = 1000, message = "description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    pub metadata: Option<Metadata>,

    #[serde(default)]
    pub provider_ids: Vec<Uuid>,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(custom(function = "entity_name"))]
    pub name: Option<String>,

    #[validate(length(max = 1000, message = "description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub is_active: Option<bool>,

    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DuplicateProjectRequest {
    #[validate(custom(function = "entity_name"))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddProjectProviderRequest {
    #[validate(custom(function = "not_nil"))]
    pub provider_id: Uuid,

    #[validate(length(max = 100, message = "role must be at most 100 characters"))]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProjectProviderRoleRequest {
    #[validate(length(max = 100, message = "role must be at most 100 characters"))]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkProjectProvidersRequest {
    #[validate(length(min = 1, message = "provider_ids must contain at least one id"))]
    pub provider_ids: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: &str) -> CreateProjectRequest {
        CreateProjectRequest {
            organization_id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            metadata: None,
            provider_ids: vec![],
        }
    }

    #[test]
    fn test_name_length_counts_characters() {
        assert!(create(&"é".repeat(255)).validate().is_ok());
        assert!(create(&"a".repeat(256)).validate().is_err());
        assert!(create("").validate().is_err());
        assert!(create("   ").validate().is_err());
    }

    #[test]
    fn test_padded_name_validated_trimmed() {
        assert!(create(&format!(" {} ", "a".repeat(255))).validate().is_ok());
        assert!(create(&format!(" {} ", "a".repeat(256))).validate().is_err());

        let update = UpdateProjectRequest {
            name: Some(format!("\t{}\n", "a".repeat(255))),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_nil_organization_rejected() {
        let mut req = create("Website");
        req.organization_id = Uuid::nil();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_description_limit() {
        let mut req = create("Website");
        req.description = Some("d".repeat(1000));
        assert!(req.validate().is_ok());
        req.description = Some("d".repeat(1001));
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_bulk_requires_ids() {
        let req = BulkProjectProvidersRequest { provider_ids: vec![] };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_body_defaults() {
        let req: CreateProjectRequest = serde_json::from_value(serde_json::json!({
            "organization_id": Uuid::new_v4(),
            "name": "Website"
        }))
        .unwrap();
        assert!(req.provider_ids.is_empty());
        assert!(req.metadata.is_none());
    }
}
