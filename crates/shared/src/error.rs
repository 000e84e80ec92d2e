use thiserror::Error;

pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to save message or send email";

/// Failures that end a contact submission request.
///
/// `Display` carries internal detail for server-side logs. What a client may
/// see is limited to [`ContactError::client_message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("request body is not a valid contact payload")]
    MalformedBody,
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("store connection failed: {0}")]
    Connection(String),
    #[error("store write failed: {0}")]
    Persistence(String),
}

impl ContactError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::MalformedBody => 400,
            Self::MethodNotAllowed => 405,
            Self::Configuration(_) | Self::Connection(_) | Self::Persistence(_) => 500,
        }
    }

    pub fn client_message(&self) -> &str {
        match self {
            Self::Validation(message) => message,
            Self::MalformedBody => "Invalid request body",
            Self::MethodNotAllowed => "Method Not Allowed",
            Self::Configuration(_) | Self::Connection(_) | Self::Persistence(_) => {
                GENERIC_FAILURE_MESSAGE
            }
        }
    }
}
