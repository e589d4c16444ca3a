//! Organization entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Top-level tenant owning projects, providers and memberships
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_user_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(name: &str, description: Option<String>, owner_user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            description: description.map(|d| d.trim().to_string()),
            owner_user_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owner(&self, user_id: Uuid) -> bool {
        self.owner_user_id == user_id
    }

    pub fn transfer_ownership(&mut self, new_owner_user_id: Uuid) {
        self.owner_user_id = new_owner_user_id;
        self.updated_at = Utc::now();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_ownership_bumps_updated_at() {
        let owner = Uuid::new_v4();
        let mut org = Organization::new("Acme", None, owner);
        let before = org.updated_at;
        let next = Uuid::new_v4();

        org.transfer_ownership(next);

        assert!(org.is_owner(next));
        assert!(!org.is_owner(owner));
        assert!(org.updated_at >= before);
    }
}
