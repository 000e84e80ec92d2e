use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

mod resend;

pub use resend::ResendDispatcher;

pub const DEFAULT_OPERATOR_ADDRESS: &str = "info.geothermx@gmail.com";
pub const DEFAULT_SENDER: &str = "GeoThermX <onboarding@resend.dev>";
pub const DEFAULT_API_URL: &str = "https://api.resend.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReceipt {
    /// Provider-side message id, when the provider returned one.
    pub provider_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("email provider credential is not configured")]
    NotConfigured,
    #[error("email provider rejected the message with status {status}")]
    Rejected { status: u16 },
    #[error("email provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<DispatchReceipt, DispatchError>;
}

/// Startup-resolved settings for operator notifications.
#[derive(Clone)]
pub struct NotifierConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub operator_address: String,
    pub sender: String,
}

impl std::fmt::Debug for NotifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifierConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("operator_address", &self.operator_address)
            .field("sender", &self.sender)
            .finish()
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.into(),
            operator_address: DEFAULT_OPERATOR_ADDRESS.into(),
            sender: DEFAULT_SENDER.into(),
        }
    }
}

/// Operator notification channel. `Unconfigured` means no provider
/// credential was supplied; callers decide how to degrade.
#[derive(Clone)]
pub enum Notifier {
    Unconfigured,
    Configured {
        dispatcher: Arc<dyn Dispatcher>,
        operator_address: String,
        sender: String,
    },
}

impl Notifier {
    pub fn from_config(config: &NotifierConfig) -> Self {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty());
        match api_key {
            Some(api_key) => Self::Configured {
                dispatcher: Arc::new(ResendDispatcher::new(&config.api_url, api_key)),
                operator_address: config.operator_address.clone(),
                sender: config.sender.clone(),
            },
            None => Self::Unconfigured,
        }
    }

    pub fn with_dispatcher(
        dispatcher: Arc<dyn Dispatcher>,
        operator_address: impl Into<String>,
        sender: impl Into<String>,
    ) -> Self {
        Self::Configured {
            dispatcher,
            operator_address: operator_address.into(),
            sender: sender.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured { .. })
    }

    /// Sends `subject`/`text` to the operator address. An unconfigured
    /// notifier answers with [`DispatchError::NotConfigured`].
    pub async fn notify_operator(
        &self,
        subject: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<DispatchReceipt, DispatchError> {
        let Self::Configured {
            dispatcher,
            operator_address,
            sender,
        } = self
        else {
            return Err(DispatchError::NotConfigured);
        };

        let email = OutboundEmail {
            from: sender.clone(),
            to: operator_address.clone(),
            subject: subject.into(),
            text: text.into(),
        };
        dispatcher.send(&email).await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
