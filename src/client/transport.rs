use async_trait::async_trait;
use derive_more::Display;
use serde::Deserialize;
use url::Url;

use crate::entities::contact_message::ContactSubmission;

#[derive(Debug, Display, PartialEq, Eq)]
pub enum ClientError {
    #[display("Request failed: {_0}")]
    Transport(String),

    #[display("Invalid response: {_0}")]
    Decode(String),
}

/// Body returned by the contact endpoint, either `{success, message}` or `{error}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContactReply {
    #[serde(skip)]
    pub status: u16,

    #[serde(default)]
    pub success: Option<bool>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub error: Option<String>,
}

impl ContactReply {
    /// Success needs a 2xx status, `success: true`, and no `error` field.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status) && self.success == Some(true) && self.error.is_none()
    }
}

#[async_trait]
pub trait ContactTransport: Send + Sync {
    async fn send(&self, submission: &ContactSubmission) -> Result<ContactReply, ClientError>;
}

pub struct HttpContactTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpContactTransport {
    pub fn new(endpoint: Url) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: Url) -> Self {
        HttpContactTransport { client, endpoint }
    }
}

#[async_trait]
impl ContactTransport for HttpContactTransport {
    async fn send(&self, submission: &ContactSubmission) -> Result<ContactReply, ClientError> {
        let response = self.client
            .post(self.endpoint.clone())
            .json(submission)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        match serde_json::from_str::<ContactReply>(&body) {
            Ok(mut reply) => {
                reply.status = status.as_u16();
                Ok(reply)
            }
            // An error status without a JSON body still counts as a reply.
            Err(_) if !status.is_success() => Ok(ContactReply {
                status: status.as_u16(),
                ..ContactReply::default()
            }),
            Err(e) => Err(ClientError::Decode(e.to_string())),
        }
    }
}
