use chrono::{DateTime, Utc};
use validator::Validate;

use crate::{
    entities::contact_message::{ContactSubmission, ContactSubmissionPayload, ContactSubmitted},
    errors::AppError,
    limiter::rate_limiter::{RateLimitDecision, RateLimitStore, RateLimiter},
    repositories::contact_message::ContactMessageRepository,
};

pub struct ContactHandler<R, S>
where
    R: ContactMessageRepository,
    S: RateLimitStore,
{
    pub contact_repo: R,
    pub rate_limiter: RateLimiter<S>,
}

impl<R, S> ContactHandler<R, S>
where
    R: ContactMessageRepository,
    S: RateLimitStore,
{
    pub fn new(contact_repo: R, rate_limiter: RateLimiter<S>) -> Self {
        ContactHandler { contact_repo, rate_limiter }
    }

    /// Handles one contact-form submission coming from `client_ip`.
    pub async fn submit_contact_message(
        &self,
        client_ip: &str,
        body: &[u8],
    ) -> Result<ContactSubmitted, AppError> {
        self.submit_contact_message_at(client_ip, body, Utc::now()).await
    }

    /// Same as [`submit_contact_message`](Self::submit_contact_message) with an explicit clock.
    ///
    /// Steps short-circuit on the first failure: rate limit, body parse,
    /// field validation (name, email, message), then persistence.
    pub async fn submit_contact_message_at(
        &self,
        client_ip: &str,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<ContactSubmitted, AppError> {
        self.check_rate_limit(client_ip, now).await?;

        let payload = parse_payload(body)?;

        let submission = ContactSubmission::from(payload);
        submission.validate()?;

        let stored = self
            .contact_repo
            .create_contact_message(&submission.into())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to store contact message");
                match e {
                    AppError::InternalError(_) => e,
                    other => AppError::InternalError(other.to_string()),
                }
            })?;

        tracing::info!(id = %stored.id, "Contact message stored");

        Ok(ContactSubmitted::sent())
    }

    /// Counts one attempt from `client_ip`, failing with `RateLimited` once the
    /// window is used up. Attempts count whether or not the body is usable.
    pub async fn check_rate_limit(&self, client_ip: &str, now: DateTime<Utc>) -> Result<(), AppError> {
        match self.rate_limiter.check(client_ip, now).await? {
            RateLimitDecision::Allowed { count } => {
                tracing::debug!(client_ip, count, "Contact submission within rate limit");
                Ok(())
            }
            RateLimitDecision::Limited { reset_at } => {
                tracing::warn!(client_ip, %reset_at, "Contact submission rate limited");
                Err(AppError::RateLimited)
            }
        }
    }
}

/// The body must be a JSON object; arrays and scalars are rejected even when
/// serde could map them onto the payload fields.
fn parse_payload(body: &[u8]) -> Result<ContactSubmissionPayload, AppError> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    if !value.is_object() {
        return Err(AppError::InvalidPayload("expected a JSON object".to_string()));
    }
    Ok(serde_json::from_value(value)?)
}
