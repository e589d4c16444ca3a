//! # Back-office Infrastructure
//!
//! Storage adapters for the core repository traits: PostgreSQL via sqlx and
//! an in-memory store with the same constraint semantics.

pub mod database;
pub mod memory;

pub use database::{
    create_pool, run_migrations, PgInvitationRepository, PgMembershipRepository,
    PgOrganizationRepository, PgProjectRepository, PgProviderRepository, PgUserProfileRepository,
    PgUserRepository,
};
pub use memory::{
    MemoryInvitationRepository, MemoryMembershipRepository, MemoryOrganizationRepository,
    MemoryProjectRepository, MemoryProviderRepository, MemoryStore, MemoryUserProfileRepository,
    MemoryUserRepository,
};
