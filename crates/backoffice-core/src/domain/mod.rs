//! Domain entities

pub mod invitation;
pub mod membership;
pub mod organization;
pub mod project;
pub mod provider;
pub mod role;
pub mod user;

pub use invitation::*;
pub use membership::*;
pub use organization::*;
pub use project::*;
pub use provider::*;
pub use role::*;
pub use user::*;

/// Free-form key/value document attached to projects and providers.
/// Stored and returned as-is; cloning yields an independent deep copy.
pub type Metadata = serde_json::Map<String, serde_json::Value>;
