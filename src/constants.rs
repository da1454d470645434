use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

pub const CONTACT_SUCCESS_MESSAGE: &str = "Message sent successfully";
pub const CONTACT_FAILURE_MESSAGE: &str = "Failed to send message. Please try again.";
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests. Please try again later.";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";
pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";

pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";
pub const CORS_ALLOW_METHODS: &str = "POST, OPTIONS";

pub const DEFAULT_MAX_SUBMISSIONS: u32 = 5;
pub const DEFAULT_WINDOW_SECS: u64 = 60 * 60;

/// Upper bound on a contact request body. Large enough for a 5000-character
/// message with generous surrounding whitespace.
pub const MAX_CONTACT_BODY_BYTES: usize = 1024 * 1024;
