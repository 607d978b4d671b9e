use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::repo_types::{ProfileChanges, Role, User};
use crate::validation::not_blank;

lazy_static! {
    static ref PHONE_RE: Regex = Regex::new(r"^\+?\d{9,15}$").expect("phone regex compiles");
}

fn valid_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.is_empty() || PHONE_RE.is_match(phone) {
        return Ok(());
    }
    let mut err = ValidationError::new("phone");
    err.message = Some(
        "Phone number must be in the format: '+999999999'. Up to 15 digits allowed.".into(),
    );
    Err(err)
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        required(message = "This field is required."),
        email(message = "Enter a valid email address.")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "This field is required."),
        custom(function = "not_blank")
    )]
    pub password: Option<String>,
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub first_name: Option<String>,
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub last_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for RegisteredUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub image: Option<String>,
}

impl From<User> for Profile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            role: u.role,
            phone: u.phone,
            image: u.image,
        }
    }
}

/// Self-service profile edit. `email` and `role` are read-only and any values
/// sent for them are dropped by deserialization.
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub first_name: Option<String>,
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub last_name: Option<String>,
    #[validate(
        length(max = 15, message = "Ensure this field has no more than 15 characters."),
        custom(function = "valid_phone")
    )]
    pub phone: Option<String>,
    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub image: Option<String>,
}

fn clearable(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| if v.is_empty() { None } else { Some(v) })
}

impl From<ProfileUpdate> for ProfileChanges {
    fn from(p: ProfileUpdate) -> Self {
        Self {
            first_name: p.first_name,
            last_name: p.last_name,
            phone: clearable(p.phone),
            image: clearable(p.image),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(required(message = "This field is required."))]
    pub old_password: Option<String>,
    #[validate(
        required(message = "This field is required."),
        custom(function = "not_blank")
    )]
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(
        required(message = "This field is required."),
        email(message = "Enter a valid email address.")
    )]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordConfirm {
    #[serde(alias = "uid_b64")]
    #[validate(required(message = "This field is required."))]
    pub uid: Option<String>,
    #[validate(required(message = "This field is required."))]
    pub token: Option<String>,
    #[validate(
        required(message = "This field is required."),
        custom(function = "not_blank")
    )]
    pub new_password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Detail {
    pub detail: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_format() {
        assert!(valid_phone("+123456789").is_ok());
        assert!(valid_phone("123456789012345").is_ok());
        assert!(valid_phone("").is_ok());
        assert!(valid_phone("12345").is_err());
        assert!(valid_phone("+1234567890123456").is_err());
        assert!(valid_phone("+12-345-6789").is_err());
    }

    #[test]
    fn phone_fits_column_width() {
        let p: ProfileUpdate = serde_json::from_str(r#"{"phone": "+123456789012345"}"#).unwrap();
        let err = p.validate().unwrap_err();
        assert!(err.field_errors().contains_key("phone"));

        let p: ProfileUpdate = serde_json::from_str(r#"{"phone": "+12345678901234"}"#).unwrap();
        assert!(p.validate().is_ok());
    }

    #[test]
    fn profile_update_ignores_read_only_fields() {
        let p: ProfileUpdate =
            serde_json::from_str(r#"{"email": "x@y.z", "role": "admin", "first_name": "A"}"#)
                .unwrap();
        let changes = ProfileChanges::from(p);
        assert_eq!(changes.first_name.as_deref(), Some("A"));
        assert!(changes.phone.is_none());
    }

    #[test]
    fn empty_phone_clears() {
        let p: ProfileUpdate = serde_json::from_str(r#"{"phone": ""}"#).unwrap();
        assert!(p.validate().is_ok());
        assert_eq!(ProfileChanges::from(p).phone, Some(None));
    }

    #[test]
    fn confirm_accepts_uid_b64_alias() {
        let c: ResetPasswordConfirm =
            serde_json::from_str(r#"{"uid_b64": "abc", "token": "t", "new_password": "p"}"#)
                .unwrap();
        assert_eq!(c.uid.as_deref(), Some("abc"));
    }

    #[test]
    fn register_rejects_bad_email() {
        let r: RegisterRequest =
            serde_json::from_str(r#"{"email": "not-an-email", "password": "pass"}"#).unwrap();
        let err = r.validate().unwrap_err();
        assert!(err.field_errors().contains_key("email"));
    }
}
