use std::borrow::Cow;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::constants::CONTACT_SUCCESS_MESSAGE;

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 100;
pub const EMAIL_MAX_CHARS: usize = 255;
pub const MESSAGE_MIN_CHARS: usize = 10;
pub const MESSAGE_MAX_CHARS: usize = 5000;

/// Fields are checked, and reported, in this order.
pub const CONTACT_FIELD_ORDER: [&str; 3] = ["name", "email", "message"];

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern must compile")
});

/// Raw request body. Every field is optional so a missing one is reported
/// as "required" instead of failing the whole parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactSubmissionPayload {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ContactSubmission {
    #[validate(custom(function = "validate_name"))]
    pub name: String,

    #[validate(custom(function = "validate_email"))]
    pub email: String,

    #[validate(custom(function = "validate_message"))]
    pub message: String,
}

impl ContactSubmission {
    /// Trims every field and lowercases the email.
    pub fn normalize(name: &str, email: &str, message: &str) -> Self {
        ContactSubmission {
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            message: message.trim().to_string(),
        }
    }
}

impl From<ContactSubmissionPayload> for ContactSubmission {
    fn from(payload: ContactSubmissionPayload) -> Self {
        ContactSubmission::normalize(
            payload.name.as_deref().unwrap_or_default(),
            payload.email.as_deref().unwrap_or_default(),
            payload.message.as_deref().unwrap_or_default(),
        )
    }
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    check_length(name, "Name", NAME_MIN_CHARS, NAME_MAX_CHARS)
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(field_error("required", "Email is required".into()));
    }
    if email.chars().count() > EMAIL_MAX_CHARS {
        return Err(field_error(
            "too_long",
            format!("Email must be at most {EMAIL_MAX_CHARS} characters"),
        ));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(field_error("invalid_email", "Please provide a valid email address".into()));
    }
    Ok(())
}

pub fn validate_message(message: &str) -> Result<(), ValidationError> {
    check_length(message, "Message", MESSAGE_MIN_CHARS, MESSAGE_MAX_CHARS)
}

// Expects an already trimmed value.
fn check_length(value: &str, label: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();

    if len == 0 {
        Err(field_error("required", format!("{label} is required")))
    } else if len < min {
        Err(field_error("too_short", format!("{label} must be at least {min} characters")))
    } else if len > max {
        Err(field_error("too_long", format!("{label} must be at most {max} characters")))
    } else {
        Ok(())
    }
}

fn field_error(code: &'static str, message: String) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Owned(message))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessageInsert {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl From<ContactSubmission> for ContactMessageInsert {
    fn from(submission: ContactSubmission) -> Self {
        ContactMessageInsert {
            name: submission.name,
            email: submission.email,
            message: submission.message,
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StoredContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmitted {
    pub success: bool,
    pub message: String,
}

impl ContactSubmitted {
    pub fn sent() -> Self {
        ContactSubmitted {
            success: true,
            message: CONTACT_SUCCESS_MESSAGE.to_string(),
        }
    }
}
