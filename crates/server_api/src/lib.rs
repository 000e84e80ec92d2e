use std::sync::Arc;

use chrono::{DateTime, Utc};
use notifier::{DispatchError, Notifier};
use shared::{
    domain::{NewContactSubmission, SubmissionId},
    error::ContactError,
    protocol::ContactPayload,
};
use storage::{ContactStore, StoreError};
use tracing::{error, info, warn};

pub const SAVED_AND_SENT_MESSAGE: &str = "Message saved & email sent";
pub const EMAIL_NOT_CONFIGURED_MESSAGE: &str =
    "Message saved, but email service is not configured on server.";
pub const EMAIL_FAILED_MESSAGE: &str =
    "Message saved, but the notification email could not be sent.";

#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<dyn ContactStore>,
    pub notifier: Notifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationStatus {
    Sent,
    NotConfigured,
    Failed,
}

/// Outcome of an accepted submission. The record is durable regardless of
/// `notification`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub submission_id: SubmissionId,
    pub created_at: DateTime<Utc>,
    pub notification: NotificationStatus,
}

impl SubmitReceipt {
    pub fn message(&self) -> &'static str {
        match self.notification {
            NotificationStatus::Sent => SAVED_AND_SENT_MESSAGE,
            NotificationStatus::NotConfigured => EMAIL_NOT_CONFIGURED_MESSAGE,
            NotificationStatus::Failed => EMAIL_FAILED_MESSAGE,
        }
    }
}

/// Validates, stores, then notifies. Notification trouble never fails the
/// call once the record is written.
#[tracing::instrument(name = "Handle contact submission", skip(ctx, payload))]
pub async fn submit_contact(
    ctx: &ApiContext,
    payload: ContactPayload,
) -> Result<SubmitReceipt, ContactError> {
    let submission = NewContactSubmission::try_from(payload)
        .inspect_err(|err| info!(%err, "contact submission rejected"))?;

    ctx.store.connect().await.map_err(persistence_fault)?;
    let stored = ctx
        .store
        .save(&submission)
        .await
        .map_err(persistence_fault)?;
    info!(submission_id = stored.id.0, "contact submission saved");

    let notification = notify_operator(&ctx.notifier, &submission).await;
    Ok(SubmitReceipt {
        submission_id: stored.id,
        created_at: stored.created_at,
        notification,
    })
}

pub fn notification_subject(submission: &NewContactSubmission) -> String {
    format!("New contact form submission from {}", submission.email())
}

pub fn notification_body(submission: &NewContactSubmission) -> String {
    let mut body = format!(
        "Name: {}\nEmail: {}\n",
        submission.display_name(),
        submission.email()
    );
    if let Some(company) = submission.company() {
        body.push_str(&format!("Company: {company}\n"));
    }
    body.push_str(&format!("\nMessage:\n\n\"{}\"\n", submission.message()));
    body
}

async fn notify_operator(
    notifier: &Notifier,
    submission: &NewContactSubmission,
) -> NotificationStatus {
    if !notifier.is_configured() {
        warn!("email provider credential is missing; operator was not notified");
        return NotificationStatus::NotConfigured;
    }

    match notifier
        .notify_operator(
            notification_subject(submission),
            notification_body(submission),
        )
        .await
    {
        Ok(_) => NotificationStatus::Sent,
        Err(DispatchError::NotConfigured) => NotificationStatus::NotConfigured,
        Err(err) => {
            error!(%err, "operator notification failed");
            NotificationStatus::Failed
        }
    }
}

fn persistence_fault(err: StoreError) -> ContactError {
    error!(%err, "contact submission was not saved");
    ContactError::from(err)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
