use derive_more::Display;

use crate::{
    client::transport::{ClientError, ContactReply, ContactTransport},
    constants::{CONTACT_FAILURE_MESSAGE, CONTACT_SUCCESS_MESSAGE},
    entities::contact_message::{validate_message, validate_name, ContactSubmission},
    errors::validation_message,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormStatus {
    #[default]
    Idle,
    Submitting,
}

/// What the user is told after one attempt. Exactly one per attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The server stored the message; the form has been cleared.
    Sent { message: String },
    /// The request was made and failed.
    Failed { message: String },
    /// Local checks failed; nothing was sent.
    Rejected { message: String },
}

impl SubmissionOutcome {
    pub fn message(&self) -> &str {
        match self {
            SubmissionOutcome::Sent { message }
            | SubmissionOutcome::Failed { message }
            | SubmissionOutcome::Rejected { message } => message,
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, SubmissionOutcome::Sent { .. })
    }
}

#[derive(Debug, Display, PartialEq, Eq)]
pub enum FormError {
    #[display("{_0}")]
    Invalid(String),

    #[display("A submission is already in progress")]
    InFlight,
}

#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
    status: FormStatus,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fields(name: impl Into<String>, email: impl Into<String>, message: impl Into<String>) -> Self {
        ContactForm {
            name: name.into(),
            email: email.into(),
            message: message.into(),
            status: FormStatus::Idle,
        }
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }

    pub fn is_submitting(&self) -> bool {
        self.status == FormStatus::Submitting
    }

    pub fn clear(&mut self) {
        self.name.clear();
        self.email.clear();
        self.message.clear();
    }

    /// Normalizes the fields and runs the local name and message checks.
    /// On success the form is marked as submitting and the payload returned.
    pub fn begin_submit(&mut self) -> Result<ContactSubmission, FormError> {
        if self.is_submitting() {
            return Err(FormError::InFlight);
        }

        let submission = ContactSubmission::normalize(&self.name, &self.email, &self.message);

        validate_name(&submission.name)
            .and_then(|_| validate_message(&submission.message))
            .map_err(|e| FormError::Invalid(validation_message(&e)))?;

        self.status = FormStatus::Submitting;
        Ok(submission)
    }

    /// Settles the in-flight attempt. Fields are cleared only on success.
    pub fn finish_submit(&mut self, result: Result<ContactReply, ClientError>) -> SubmissionOutcome {
        self.status = FormStatus::Idle;

        match result {
            Ok(reply) if reply.is_success() => {
                self.clear();
                SubmissionOutcome::Sent {
                    message: reply.message.unwrap_or_else(|| CONTACT_SUCCESS_MESSAGE.to_string()),
                }
            }
            Ok(reply) => {
                tracing::warn!(status = reply.status, "Contact submission failed");
                SubmissionOutcome::Failed {
                    message: reply.error.unwrap_or_else(|| CONTACT_FAILURE_MESSAGE.to_string()),
                }
            }
            Err(e) => {
                tracing::warn!("Contact submission failed: {}", e);
                SubmissionOutcome::Failed {
                    message: CONTACT_FAILURE_MESSAGE.to_string(),
                }
            }
        }
    }

    pub async fn submit<T>(&mut self, transport: &T) -> SubmissionOutcome
    where
        T: ContactTransport + ?Sized,
    {
        let submission = match self.begin_submit() {
            Ok(submission) => submission,
            Err(e) => return SubmissionOutcome::Rejected { message: e.to_string() },
        };

        let result = transport.send(&submission).await;
        self.finish_submit(result)
    }
}
