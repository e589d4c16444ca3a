//! Invitation entity

use chrono::{DateTime, Duration, Utc};
use rand::random;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use backoffice_shared::constants::INVITATION_TOKEN_BYTES;

use super::Role;
use crate::error::DomainError;

/// Single-use, expiring offer of a role to an email address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub inviter_user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub token: String,
    pub is_used: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    pub fn new(
        organization_id: Uuid,
        inviter_user_id: Uuid,
        email: &str,
        role: Role,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            organization_id,
            inviter_user_id,
            email: email.trim().to_lowercase(),
            role,
            token: generate_token(),
            is_used: false,
            expires_at: now + ttl,
            created_at: now,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Used wins over expired when both apply.
    pub fn ensure_redeemable(&self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.is_used {
            return Err(DomainError::InvitationAlreadyUsed);
        }
        if self.is_expired_at(now) {
            return Err(DomainError::InvitationExpired);
        }
        Ok(())
    }

    /// Marks the invitation used. Fails once used or once `now` is past the
    /// expiry; a used invitation never becomes unused again.
    pub fn redeem(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_redeemable(now)?;
        self.is_used = true;
        Ok(())
    }
}

fn generate_token() -> String {
    let bytes: [u8; INVITATION_TOKEN_BYTES] = random();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invitation(ttl: Duration) -> Invitation {
        Invitation::new(Uuid::new_v4(), Uuid::new_v4(), "Guest@Example.com", Role::OrgMember, ttl)
    }

    #[test]
    fn test_token_is_random_hex() {
        let a = invitation(Duration::hours(1));
        let b = invitation(Duration::hours(1));
        assert_eq!(a.token.len(), INVITATION_TOKEN_BYTES * 2);
        assert!(a.token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a.token, b.token);
        assert_eq!(a.email, "guest@example.com");
    }

    #[test]
    fn test_redeem_is_one_shot() {
        let mut inv = invitation(Duration::hours(1));
        assert!(inv.redeem(Utc::now()).is_ok());
        assert!(inv.is_used);
        assert!(matches!(inv.redeem(Utc::now()), Err(DomainError::InvitationAlreadyUsed)));
        assert!(inv.is_used);
    }

    #[test]
    fn test_redeem_after_expiry_fails() {
        let mut inv = invitation(Duration::hours(1));
        let later = inv.expires_at + Duration::seconds(1);
        assert!(matches!(inv.redeem(later), Err(DomainError::InvitationExpired)));
        assert!(!inv.is_used);
    }

    #[test]
    fn test_used_reported_before_expired() {
        let mut inv = invitation(Duration::hours(1));
        inv.is_used = true;
        let later = inv.expires_at + Duration::seconds(1);
        assert!(matches!(inv.ensure_redeemable(later), Err(DomainError::InvitationAlreadyUsed)));
    }

    #[test]
    fn test_redeem_at_exact_expiry_succeeds() {
        let mut inv = invitation(Duration::hours(1));
        let at = inv.expires_at;
        assert!(inv.redeem(at).is_ok());
    }
}
