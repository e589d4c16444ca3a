//! # Back-office Shared
//!
//! Shared utilities, pagination types, configuration and telemetry for the
//! back-office workspace.

pub mod constants;
pub mod types;
pub mod utils;
pub mod telemetry;
pub mod config;
pub mod error;

pub use types::*;
pub use error::AppError;
