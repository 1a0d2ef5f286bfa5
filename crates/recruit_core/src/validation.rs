//! crates/recruit_core/src/validation.rs
//!
//! Field-level validation for the basic-information step and the contact form.
//! Errors are reported per field and never block navigation on their own.

use crate::domain::{ContactMessage, PersonalInfo};
use regex::Regex;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use validator::{Validate, ValidationError, ValidationErrors};

/// Field name -> human readable messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

fn phone_regex() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(r"^(?:\+?91)?[6-9][0-9]{9}$").expect("phone pattern is valid"))
}

fn with_message(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(with_message("required", "This field is required"));
    }
    Ok(())
}

/// Accepts a 10 digit mobile number, optionally prefixed with `+91`.
/// Spaces and dashes are ignored.
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let digits: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    if digits.is_empty() {
        return Err(with_message("required", "This field is required"));
    }
    if !phone_regex().is_match(&digits) {
        return Err(with_message("phone", "Enter a valid 10 digit phone number"));
    }
    Ok(())
}

pub fn validate_year(value: &str) -> Result<(), ValidationError> {
    match value.trim() {
        "" => Err(with_message("required", "This field is required")),
        "1" | "2" | "3" | "4" => Ok(()),
        _ => Err(with_message("year", "Year must be between 1 and 4")),
    }
}

fn into_field_errors(errors: ValidationErrors) -> FieldErrors {
    let mut map = FieldErrors::new();
    for (field, field_errors) in errors.field_errors() {
        let messages = field_errors
            .iter()
            .map(|error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("Invalid value for field '{}'", field))
            })
            .collect();
        map.insert(field.to_string(), messages);
    }
    map
}

pub fn validate_personal_info(info: &PersonalInfo) -> Result<(), FieldErrors> {
    info.validate().map_err(into_field_errors)
}

pub fn validate_contact_message(message: &ContactMessage) -> Result<(), FieldErrors> {
    message.validate().map_err(into_field_errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> PersonalInfo {
        PersonalInfo {
            name: "Ravi Kumar".into(),
            email: "ravi@college.edu".into(),
            phone: "+91 98765-43210".into(),
            branch: "ECE".into(),
            year: "3".into(),
            college: "NIT".into(),
            preferred_role: "Frontend".into(),
            experience: "None yet".into(),
            motivation: "Learning by shipping things with others.".into(),
        }
    }

    #[test]
    fn accepts_complete_form() {
        assert!(validate_personal_info(&info()).is_ok());
    }

    #[test]
    fn empty_form_reports_every_field() {
        let errors = validate_personal_info(&PersonalInfo::default()).unwrap_err();
        for field in [
            "name",
            "email",
            "phone",
            "branch",
            "year",
            "college",
            "preferred_role",
            "experience",
            "motivation",
        ] {
            assert!(errors.contains_key(field), "missing error for {field}");
        }
    }

    #[test]
    fn phone_rules() {
        assert!(validate_phone("9876543210").is_ok());
        assert!(validate_phone("919876543210").is_ok());
        assert!(validate_phone("98765 43210").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("1234567890").is_err());
        assert!(validate_phone("98765abcde").is_err());
    }

    #[test]
    fn year_rules() {
        assert!(validate_year("4").is_ok());
        assert!(validate_year(" 1 ").is_ok());
        assert!(validate_year("5").is_err());
        assert!(validate_year("").is_err());
    }

    #[test]
    fn short_motivation_has_readable_message() {
        let mut form = info();
        form.motivation = "because".into();
        let errors = validate_personal_info(&form).unwrap_err();
        assert_eq!(
            errors["motivation"],
            vec!["Tell us a little more (at least 20 characters)".to_string()]
        );
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn contact_message_rules() {
        let mut message = ContactMessage {
            name: "Meera".into(),
            email: "meera@example.com".into(),
            subject: "Sponsorship".into(),
            message: "We would love to sponsor your next hackathon.".into(),
        };
        assert!(validate_contact_message(&message).is_ok());

        message.email = "meera".into();
        message.message = "hi".into();
        let errors = validate_contact_message(&message).unwrap_err();
        assert!(errors.contains_key("email"));
        assert!(errors.contains_key("message"));
        assert!(!errors.contains_key("name"));
    }
}
