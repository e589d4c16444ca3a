//! Request DTOs accepted by the services
//!
//! Every request type derives `Validate`; services validate before touching
//! any repository.

pub mod common;
pub mod organization;
pub mod project;
pub mod provider;
pub mod user;

pub use common::*;
pub use organization::*;
pub use project::*;
pub use provider::*;
pub use user::*;
