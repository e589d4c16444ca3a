//! Provider entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Metadata;

/// Provider entity, unique by `(organization_id, name)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub organization_id: Uuid,
    pub name: String,
    pub provider_code: Option<String>,
    pub is_active: bool,
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Provider {
    pub fn new(
        organization_id: Uuid,
        user_id: Option<Uuid>,
        name: &str,
        provider_code: Option<String>,
        metadata: Metadata,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            organization_id,
            name: name.trim().to_string(),
            provider_code: provider_code.map(|c| c.trim().to_string()),
            is_active: true,
            metadata,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn rename(&mut self, name: &str) {
        self.name = name.trim().to_string();
        self.touch();
    }

    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
