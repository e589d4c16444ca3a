//! Listing parameters and shared validators

use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use backoffice_shared::constants::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use backoffice_shared::{Pagination, SortField, SortOrder};

const MAX_NAME_CHARS: usize = 255;
const MAX_PERSON_NAME_CHARS: usize = 100;

/// Raw listing parameters as received from a query string.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListParams {
    pub organization_id: Option<Uuid>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "page_size must be between 1 and 100"))]
    pub page_size: Option<u32>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
}

impl ListParams {
    pub fn into_query(self) -> ListQuery {
        ListQuery {
            organization_id: self.organization_id,
            is_active: self.is_active,
            search: self
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            pagination: Pagination::new(
                self.page.unwrap_or(DEFAULT_PAGE),
                self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            ),
            sort_by: self.sort_by.unwrap_or_default(),
            sort_order: self.sort_order.unwrap_or_default(),
        }
    }
}

/// Normalised listing query handed to repositories.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub organization_id: Option<Uuid>,
    pub is_active: Option<bool>,
    /// Case-insensitive substring, already trimmed and non-empty.
    pub search: Option<String>,
    pub pagination: Pagination,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for ListQuery {
    fn default() -> Self {
        ListParams::default().into_query()
    }
}

/// Names are stored trimmed, so both bounds apply to the trimmed value.
pub(crate) fn entity_name(value: &str) -> Result<(), ValidationError> {
    trimmed_length(value, MAX_NAME_CHARS, "name must be between 1 and 255 characters")
}

pub(crate) fn person_name(value: &str) -> Result<(), ValidationError> {
    trimmed_length(value, MAX_PERSON_NAME_CHARS, "must be between 1 and 100 characters")
}

fn trimmed_length(value: &str, max: usize, message: &'static str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    if trimmed.chars().count() > max {
        let mut err = ValidationError::new("length");
        err.message = Some(message.into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn not_nil(id: &Uuid) -> Result<(), ValidationError> {
    if id.is_nil() {
        let mut err = ValidationError::new("required");
        err.message = Some("is required".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let query = ListParams::default().into_query();
        assert_eq!(query.pagination, Pagination::new(1, 20));
        assert_eq!(query.sort_by, SortField::CreatedAt);
        assert_eq!(query.sort_order, SortOrder::Desc);
        assert!(query.search.is_none());
    }

    #[test]
    fn test_blank_search_dropped() {
        let params = ListParams {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert!(params.into_query().search.is_none());
    }

    #[test]
    fn test_name_bounds_apply_after_trim() {
        let padded = format!("  {}  ", "n".repeat(255));
        assert!(entity_name(&padded).is_ok());
        assert!(entity_name(&"n".repeat(256)).is_err());
        assert_eq!(entity_name(" \t ").unwrap_err().code, "blank");
    }

    #[test]
    fn test_page_size_bounds() {
        let params = ListParams {
            page_size: Some(101),
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = ListParams {
            page: Some(0),
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
