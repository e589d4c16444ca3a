//! Application-wide constants

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Upper bound for the by-name search endpoints.
pub const SEARCH_RESULT_LIMIT: usize = 50;

pub const DEFAULT_INVITATION_TTL_HOURS: i64 = 168;
pub const INVITATION_TOKEN_BYTES: usize = 32;
