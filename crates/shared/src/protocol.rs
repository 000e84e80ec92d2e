use serde::{Deserialize, Serialize};

pub const FIELD_FIRST_NAME: &str = "firstName";
pub const FIELD_LAST_NAME: &str = "lastName";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_COMPANY: &str = "company";
pub const FIELD_MESSAGE: &str = "message";

/// Form field names in the order the contact form lays them out.
pub const CONTACT_FIELDS: [&str; 5] = [
    FIELD_FIRST_NAME,
    FIELD_LAST_NAME,
    FIELD_EMAIL,
    FIELD_COMPANY,
    FIELD_MESSAGE,
];

pub fn contact_route() -> &'static str {
    "/contact"
}

/// Path the static site script posts to when deployed behind Netlify.
pub fn legacy_contact_route() -> &'static str {
    "/.netlify/functions/contact"
}

/// Contact form as sent over the wire. Every field may be missing; the
/// server decides what is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub message: Option<String>,
}

impl ContactPayload {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.slot(name).and_then(|value| value.as_deref())
    }

    /// Sets a field by its form name. Unknown names are ignored.
    pub fn set_field(&mut self, name: &str, value: Option<String>) {
        if let Some(slot) = self.slot_mut(name) {
            *slot = value;
        }
    }

    fn slot(&self, name: &str) -> Option<&Option<String>> {
        match name {
            FIELD_FIRST_NAME => Some(&self.first_name),
            FIELD_LAST_NAME => Some(&self.last_name),
            FIELD_EMAIL => Some(&self.email),
            FIELD_COMPANY => Some(&self.company),
            FIELD_MESSAGE => Some(&self.message),
            _ => None,
        }
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            FIELD_FIRST_NAME => Some(&mut self.first_name),
            FIELD_LAST_NAME => Some(&mut self.last_name),
            FIELD_EMAIL => Some(&mut self.email),
            FIELD_COMPANY => Some(&mut self.company),
            FIELD_MESSAGE => Some(&mut self.message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmitResponse {
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
