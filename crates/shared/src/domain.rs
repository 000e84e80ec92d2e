use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{error::ContactError, protocol::ContactPayload};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(SubmissionId);

pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// Syntactic `local@domain.tld` check. No whitespace, one `@`, and a `.`
/// somewhere after it with text on both sides.
pub fn is_plausible_email(candidate: &str) -> bool {
    EMAIL_PATTERN.is_match(candidate)
}

/// A contact submission that passed server-side validation and is ready to
/// be written. Required fields are trimmed and non-empty; blank optional
/// fields are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContactSubmission {
    first_name: String,
    last_name: Option<String>,
    email: String,
    company: Option<String>,
    message: String,
}

impl NewContactSubmission {
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last_name) => format!("{} {last_name}", self.first_name),
            None => self.first_name.clone(),
        }
    }
}

impl TryFrom<ContactPayload> for NewContactSubmission {
    type Error = ContactError;

    fn try_from(payload: ContactPayload) -> Result<Self, Self::Error> {
        let (Some(first_name), Some(email), Some(message)) = (
            non_blank(payload.first_name),
            non_blank(payload.email),
            non_blank(payload.message),
        ) else {
            return Err(ContactError::validation(MISSING_FIELDS_MESSAGE));
        };

        Ok(Self {
            first_name,
            last_name: non_blank(payload.last_name),
            email,
            company: non_blank(payload.company),
            message,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
