//! Payloads for the single-shot form submissions.

use crate::error::ApiError;
use serde::Serialize;
use validator::{Validate, ValidationErrors};

/// Inquiry about a listing, or a general contact message when `property` is empty
#[derive(Debug, Clone, Serialize, Validate, PartialEq)]
pub struct NewInquiry {
    pub property: Option<u64>,

    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,

    pub phone: String,

    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub inquiry_type: Option<String>,
}

impl NewInquiry {
    /// Inquiry sent from a property's detail page
    pub fn about(
        property: u64,
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            property: Some(property),
            name: name.into(),
            email: email.into(),
            phone: String::new(),
            message: message.into(),
            inquiry_type: None,
        }
    }

    /// Message from the contact page; a subject becomes the first paragraph
    pub fn contact(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: Option<String>,
        subject: Option<&str>,
        message: &str,
    ) -> Self {
        let message = match subject.filter(|s| !s.trim().is_empty()) {
            Some(subject) => format!("{subject}\n\n{message}"),
            None => message.to_string(),
        };
        Self {
            property: None,
            name: name.into(),
            email: email.into(),
            phone: phone.unwrap_or_default(),
            message,
            inquiry_type: Some("general".to_string()),
        }
    }

    pub fn check(&self) -> Result<(), ApiError> {
        self.validate().map_err(validation_error)
    }
}

/// Signup form; only the profile part is sent to the listing API
#[derive(Debug, Clone, Validate)]
pub struct Signup {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,

    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,

    pub phone: Option<String>,
    pub role: Option<String>,
}

impl Signup {
    pub fn check(&self) -> Result<(), ApiError> {
        self.validate().map_err(validation_error)
    }

    /// Profile for the account the auth provider created with id `user`
    pub fn profile(&self, user: impl Into<String>) -> NewProfile {
        NewProfile {
            user: user.into(),
            full_name: self.full_name.clone(),
            phone: self.phone.clone(),
            role: self.role.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewProfile {
    pub user: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: Option<String>,
}

fn validation_error(errors: ValidationErrors) -> ApiError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid"))
            })
        })
        .collect();
    messages.sort();
    ApiError::Validation(messages.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_message_prefixes_subject() {
        let inquiry = NewInquiry::contact(
            "Wanjiru",
            "w@example.com",
            None,
            Some("Viewing"),
            "Is Saturday possible?",
        );
        assert_eq!(inquiry.message, "Viewing\n\nIs Saturday possible?");
        assert_eq!(inquiry.inquiry_type.as_deref(), Some("general"));
        assert_eq!(inquiry.property, None);
        assert!(inquiry.check().is_ok());
    }

    #[test]
    fn blank_subject_is_dropped() {
        let inquiry = NewInquiry::contact("A", "a@b.co", None, Some("  "), "Hi");
        assert_eq!(inquiry.message, "Hi");
    }

    #[test]
    fn inquiry_requires_valid_email_and_message() {
        let inquiry = NewInquiry::about(4, "Tom", "not-an-email", "");
        match inquiry.check() {
            Err(ApiError::Validation(msg)) => {
                assert!(msg.contains("Enter a valid email address"));
                assert!(msg.contains("Message is required"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn signup_rejects_mismatched_passwords() {
        let signup = Signup {
            full_name: "Ana".into(),
            email: "ana@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret2".into(),
            phone: None,
            role: Some("buyer".into()),
        };
        match signup.check() {
            Err(ApiError::Validation(msg)) => assert_eq!(msg, "Passwords do not match"),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(signup.profile("uid-1").role.as_deref(), Some("buyer"));
    }
}
