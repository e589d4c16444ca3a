//! # Back-office Core
//!
//! Domain entities, request DTOs, repository traits and services for the
//! organizations / projects / providers back office.

pub mod domain;
pub mod dto;
pub mod error;
pub mod repositories;
pub mod services;

// Re-export domain entities
pub use domain::*;
pub use error::{DomainError, ErrorCode, ErrorDomain, ErrorKind};
