use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::{contact_route, ContactPayload, SubmitResponse};
use thiserror::Error;
use tracing::warn;
use url::Url;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid contact endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("contact request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Carries a contact payload to the submission handler. `Err` means no
/// response was received at all.
#[async_trait]
pub trait ContactTransport: Send + Sync {
    async fn send(&self, payload: &ContactPayload) -> Result<SubmitResponse, TransportError>;
}

pub struct HttpContactClient {
    http: Client,
    endpoint: Url,
}

impl HttpContactClient {
    pub fn new(endpoint: &str) -> Result<Self, TransportError> {
        Ok(Self {
            http: Client::new(),
            endpoint: Url::parse(endpoint)?,
        })
    }

    /// Targets the standard contact route on `server_url`.
    pub fn for_server(server_url: &str) -> Result<Self, TransportError> {
        let endpoint = Url::parse(server_url)?.join(contact_route())?;
        Ok(Self {
            http: Client::new(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ContactTransport for HttpContactClient {
    async fn send(&self, payload: &ContactPayload) -> Result<SubmitResponse, TransportError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        match serde_json::from_slice::<SubmitResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(error) => {
                warn!(status = status.as_u16(), %error, "contact endpoint returned an unreadable body");
                Ok(SubmitResponse {
                    success: false,
                    message: None,
                    error: None,
                })
            }
        }
    }
}
