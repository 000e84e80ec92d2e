use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{DispatchError, DispatchReceipt, Dispatcher, OutboundEmail};

/// Dispatcher for the Resend HTTP email API (and anything that speaks the
/// same `POST /emails` shape).
pub struct ResendDispatcher {
    http: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}

impl ResendDispatcher {
    pub fn new(api_url: &str, api_key: &str) -> Self {
        Self {
            http: Client::new(),
            endpoint: format!("{}/emails", api_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Dispatcher for ResendDispatcher {
    async fn send(&self, email: &OutboundEmail) -> Result<DispatchReceipt, DispatchError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&SendEmailRequest {
                from: &email.from,
                to: [&email.to],
                subject: &email.subject,
                text: &email.text,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), %body, "email provider rejected message");
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
            });
        }

        let provider_id = response
            .json::<SendEmailResponse>()
            .await
            .ok()
            .and_then(|body| body.id);
        info!(
            provider_id = provider_id.as_deref().unwrap_or("unknown"),
            "email accepted by provider"
        );
        Ok(DispatchReceipt { provider_id })
    }
}
