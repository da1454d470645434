use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse
};
use derive_more::Display;
use serde::Serialize;
use validator::{ValidationError, ValidationErrors};

use crate::constants::{
    CONTACT_FAILURE_MESSAGE, INVALID_BODY_MESSAGE, METHOD_NOT_ALLOWED_MESSAGE, RATE_LIMITED_MESSAGE,
};
use crate::entities::contact_message::CONTACT_FIELD_ORDER;

#[derive(Debug, Display)]
pub enum AppError {
    #[display("validation error: {}:{}", _0.field, _0.message)]
    Validation(FieldError),

    #[display("Invalid request body: {_0}")]
    InvalidPayload(String),

    #[display("Rate limit exceeded")]
    RateLimited,

    #[display("Method not allowed")]
    MethodNotAllowed,

    #[display("Internal server error: {_0}")]
    InternalError(String),
}

impl AppError {
    /// The message sent to the caller. Internal details never leave the server.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation(err) => err.message.clone(),
            AppError::InvalidPayload(_) => INVALID_BODY_MESSAGE.to_string(),
            AppError::RateLimited => RATE_LIMITED_MESSAGE.to_string(),
            AppError::MethodNotAllowed => METHOD_NOT_ALLOWED_MESSAGE.to_string(),
            AppError::InternalError(_) => CONTACT_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(serde_json::json!({"error": self.public_message()}))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Reports only the first failing field, in the order the contact form declares them.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let field_errors = errors.field_errors();

        let first = CONTACT_FIELD_ORDER
            .iter()
            .find_map(|name| {
                field_errors
                    .iter()
                    .find(|(field, _)| *field == *name)
                    .and_then(|(field, errs)| errs.first().map(|e| (field.to_string(), e)))
            })
            .or_else(|| {
                field_errors
                    .iter()
                    .find_map(|(field, errs)| errs.first().map(|e| (field.to_string(), e)))
            });

        match first {
            Some((field, error)) => AppError::Validation(FieldError {
                field,
                message: validation_message(error),
            }),
            None => AppError::InvalidPayload("validation failed without field errors".into()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidPayload(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalError(format!("Database error: {}", err))
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::InternalError(format!("Redis operation failed: {}", err))
    }
}

impl From<deadpool_redis::PoolError> for AppError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        AppError::InternalError(format!("Redis connection failed: {}", err))
    }
}

pub fn validation_message(error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "Invalid value".to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}
