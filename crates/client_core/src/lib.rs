use shared::{
    domain::is_plausible_email,
    protocol::{
        ContactPayload, CONTACT_FIELDS, FIELD_EMAIL, FIELD_FIRST_NAME, FIELD_MESSAGE,
    },
};
use thiserror::Error;
use tracing::{info, warn};

pub mod transport;

pub use transport::{ContactTransport, HttpContactClient, TransportError};

pub const SENDING_LABEL: &str = "Sending...";
pub const SENT_NOTICE: &str = "Message sent successfully!";
pub const FALLBACK_ERROR: &str = "try again later";
pub const NETWORK_ERROR_NOTICE: &str = "Network error. Please try again later.";

const REQUIRED_FIELDS: [&str; 3] = [FIELD_FIRST_NAME, FIELD_EMAIL, FIELD_MESSAGE];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocalValidationError {
    #[error("Please fill in all required fields.")]
    MissingFields,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
}

/// What the user is told once a submit attempt finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Invalid(LocalValidationError),
    Sent(String),
    /// The server answered but refused; carries its error text.
    Rejected(String),
    NetworkError,
}

impl Notice {
    pub fn text(&self) -> String {
        match self {
            Self::Invalid(err) => err.to_string(),
            Self::Sent(message) => message.clone(),
            Self::Rejected(error) => format!("Something went wrong: {error}"),
            Self::NetworkError => NETWORK_ERROR_NOTICE.to_string(),
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent(_))
    }
}

/// The page hosting the contact form, as far as the collector cares.
pub trait ContactFormView {
    fn field_value(&self, name: &str) -> Option<String>;
    fn submit_label(&self) -> String;
    fn set_submit_label(&mut self, label: &str);
    fn set_submit_enabled(&mut self, enabled: bool);
    fn reset_fields(&mut self);
    fn show_notice(&mut self, notice: &Notice);
}

pub fn collect_payload(view: &impl ContactFormView) -> ContactPayload {
    let mut payload = ContactPayload::default();
    for name in CONTACT_FIELDS {
        payload.set_field(name, view.field_value(name));
    }
    payload
}

pub fn validate_payload(payload: &ContactPayload) -> Result<(), LocalValidationError> {
    let missing = REQUIRED_FIELDS
        .iter()
        .any(|name| !payload.field(name).is_some_and(|value| !value.trim().is_empty()));
    if missing {
        return Err(LocalValidationError::MissingFields);
    }

    if !payload.field(FIELD_EMAIL).is_some_and(is_plausible_email) {
        return Err(LocalValidationError::InvalidEmail);
    }
    Ok(())
}

/// Holds the submit control in its "in flight" state. Dropping the guard
/// puts the original label back and re-enables the control.
pub struct SubmittingGuard<'a, V: ContactFormView> {
    view: &'a mut V,
    original_label: String,
}

impl<'a, V: ContactFormView> SubmittingGuard<'a, V> {
    pub fn acquire(view: &'a mut V) -> Self {
        let original_label = view.submit_label();
        view.set_submit_enabled(false);
        view.set_submit_label(SENDING_LABEL);
        Self {
            view,
            original_label,
        }
    }
}

impl<V: ContactFormView> Drop for SubmittingGuard<'_, V> {
    fn drop(&mut self) {
        self.view.set_submit_label(&self.original_label);
        self.view.set_submit_enabled(true);
    }
}

pub struct ContactCollector<T: ContactTransport> {
    transport: T,
}

impl<T: ContactTransport> ContactCollector<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Runs one submit attempt against `view` and returns the notice shown.
    /// Local validation failures never touch the network; nothing is retried.
    pub async fn submit<V: ContactFormView>(&self, view: &mut V) -> Notice {
        let payload = collect_payload(view);
        if let Err(err) = validate_payload(&payload) {
            let notice = Notice::Invalid(err);
            view.show_notice(&notice);
            return notice;
        }

        let result = {
            let _submitting = SubmittingGuard::acquire(view);
            self.transport.send(&payload).await
        };

        let notice = match result {
            Ok(response) if response.success => {
                info!("contact submission accepted");
                view.reset_fields();
                Notice::Sent(response.message.unwrap_or_else(|| SENT_NOTICE.to_string()))
            }
            Ok(response) => {
                Notice::Rejected(response.error.unwrap_or_else(|| FALLBACK_ERROR.to_string()))
            }
            Err(error) => {
                warn!(%error, "contact submission did not reach the server");
                Notice::NetworkError
            }
        };
        view.show_notice(&notice);
        notice
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
