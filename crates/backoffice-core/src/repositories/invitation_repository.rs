//! Invitation repository trait (port)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Invitation, Membership};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvitationRepository: Send + Sync {
    async fn create(&self, invitation: &Invitation) -> Result<Invitation, DomainError>;
    async fn find_by_token(&self, token: &str) -> Result<Option<Invitation>, DomainError>;
    async fn find_by_organization(&self, organization_id: Uuid) -> Result<Vec<Invitation>, DomainError>;
    /// Claims the invitation for `token` and inserts `membership` as one unit.
    ///
    /// Only an unused invitation that has not expired at `now` can be
    /// claimed, so of two concurrent redemptions exactly one succeeds. If the
    /// membership insert fails the invitation stays unused.
    async fn redeem(
        &self,
        token: &str,
        membership: &Membership,
        now: DateTime<Utc>,
    ) -> Result<Membership, DomainError>;
}
