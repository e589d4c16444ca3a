//! HTTP handlers, one module per resource

pub mod health;
pub mod organizations;
pub mod projects;
pub mod providers;
pub mod users;
