//! User request DTOs

use serde::Deserialize;
use validator::{Validate, ValidationError};

use super::common::{entity_name, person_name};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,

    #[validate(custom(function = "entity_name"))]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(custom(function = "entity_name"))]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserListParams {
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserProfileRequest {
    #[validate(custom(function = "person_name"))]
    pub first_name: String,

    #[validate(custom(function = "person_name"))]
    pub last_name: String,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserProfileRequest {
    #[validate(custom(function = "person_name"))]
    pub first_name: Option<String>,

    #[validate(custom(function = "person_name"))]
    pub last_name: Option<String>,

    #[validate(length(max = 500, message = "bio must be at most 500 characters"))]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfilePictureRequest {
    #[validate(url(message = "picture_url must be a valid URL"))]
    pub picture_url: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetPhoneRequest {
    #[validate(custom(function = "phone_number"))]
    pub phone: String,
}

/// Digits with an optional leading `+`; spaces, dashes and parentheses are
/// allowed as separators.
fn phone_number(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    let digits = value.chars().filter(char::is_ascii_digit).count();
    let allowed = value
        .char_indices()
        .all(|(i, c)| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')') || (c == '+' && i == 0));

    if !allowed || !(7..=15).contains(&digits) {
        let mut err = ValidationError::new("phone");
        err.message = Some("phone must be 7 to 15 digits".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_formats() {
        assert!(phone_number("+62 812-3456-7890").is_ok());
        assert!(phone_number("(021) 555 0199").is_ok());
        assert!(phone_number("12345").is_err());
        assert!(phone_number("62+8123456789").is_err());
        assert!(phone_number("call me").is_err());
    }

    #[test]
    fn test_picture_must_be_url() {
        let ok = UpdateProfilePictureRequest { picture_url: "https://cdn.example.com/a.png".into() };
        assert!(ok.validate().is_ok());
        let bad = UpdateProfilePictureRequest { picture_url: "not a url".into() };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_profile_names_required() {
        let req = CreateUserProfileRequest { first_name: " ".into(), last_name: "Doe".into() };
        assert!(req.validate().is_err());
        let req = CreateUserProfileRequest { first_name: "J".repeat(101), last_name: "Doe".into() };
        assert!(req.validate().is_err());
    }
}
