//! # Back-office API
//!
//! axum handlers, router, JSON envelope and the mapping from domain errors
//! to HTTP responses.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, Repositories};
