//! User entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: &str, name: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.trim().to_lowercase(),
            name: name.trim().to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
        self.updated_at = Utc::now();
    }

    pub fn rename(&mut self, name: &str) {
        self.name = name.trim().to_string();
        self.updated_at = Utc::now();
    }
}

/// Optional personal details, at most one per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(user_id: Uuid, first_name: &str, last_name: &str) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            bio: None,
            profile_picture: None,
            phone: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_first_name(&mut self, first_name: &str) {
        self.first_name = first_name.trim().to_string();
        self.touch();
    }

    pub fn set_last_name(&mut self, last_name: &str) {
        self.last_name = last_name.trim().to_string();
        self.touch();
    }

    /// A blank bio clears it.
    pub fn set_bio(&mut self, bio: &str) {
        let bio = bio.trim();
        self.bio = (!bio.is_empty()).then(|| bio.to_string());
        self.touch();
    }

    pub fn set_profile_picture(&mut self, url: &str) {
        self.profile_picture = Some(url.trim().to_string());
        self.touch();
    }

    pub fn set_phone(&mut self, phone: &str) {
        self.phone = Some(phone.trim().to_string());
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_trims_and_clears_bio() {
        let mut profile = UserProfile::new(Uuid::new_v4(), " Jane ", "Doe ");
        assert_eq!((profile.first_name.as_str(), profile.last_name.as_str()), ("Jane", "Doe"));

        profile.set_bio("  Ships things  ");
        assert_eq!(profile.bio.as_deref(), Some("Ships things"));
        profile.set_bio("   ");
        assert!(profile.bio.is_none());
        assert!(profile.updated_at >= profile.created_at);
    }
}
