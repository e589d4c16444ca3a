//! Provider request DTOs

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::common::{entity_name, not_nil};
use crate::domain::Metadata;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProviderRequest {
    #[validate(custom(function = "not_nil"))]
    pub organization_id: Uuid,

    pub user_id: Option<Uuid>,

    #[validate(custom(function = "entity_name"))]
    pub name: String,

    #[validate(length(max = 50, message = "provider_code must be at most 50 characters"))]
    pub provider_code: Option<String>,

    pub is_active: Option<bool>,

    #[serde(default)]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProviderRequest {
    pub user_id: Option<Uuid>,

    #[validate(custom(function = "entity_name"))]
    pub name: Option<String>,

    #[validate(length(max = 50, message = "provider_code must be at most 50 characters"))]
    pub provider_code: Option<String>,

    pub is_active: Option<bool>,

    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DuplicateProviderRequest {
    #[validate(custom(function = "entity_name"))]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_code_limit() {
        let mut req = CreateProviderRequest {
            organization_id: Uuid::new_v4(),
            user_id: None,
            name: "Acme Supplies".into(),
            provider_code: Some("c".repeat(50)),
            is_active: None,
            metadata: None,
        };
        assert!(req.validate().is_ok());
        req.provider_code = Some("c".repeat(51));
        assert!(req.validate().is_err());
    }
}
