//! crates/recruit_core/src/submission.rs
//!
//! Sends finished applications and contact messages to the persistence and
//! notification collaborators.
//!
//! Persistence decides the outcome. A rejected save is shown to the candidate
//! and can be retried by hand. Notification problems are only logged, and an
//! unexpected persistence error still produces the "application received" message.

use crate::domain::{ApplicationRecord, ContactMessage, Notification, NotificationKind};
use crate::ports::{NotificationService, PersistenceService, PortResult, SaveReceipt};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const RECEIVED_MESSAGE: &str =
    "Your application has been received. We will be in touch soon.";
pub const CONTACT_RECEIVED_MESSAGE: &str = "Thanks for reaching out! We will get back to you soon.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// Persisted. Notification may or may not have gone out.
    Submitted { id: Option<String> },
    /// The persistence collaborator rejected the save.
    Failed { message: String },
    /// Something unexpected happened; the candidate still sees a receipt.
    Received { message: String },
}

impl SubmissionOutcome {
    /// Whether the candidate sees a success indication.
    pub fn is_success(&self) -> bool {
        !matches!(self, SubmissionOutcome::Failed { .. })
    }
}

/// The explicitly constructed submission service; collaborators are injected.
#[derive(Clone)]
pub struct Submitter {
    persistence: Arc<dyn PersistenceService>,
    notifier: Arc<dyn NotificationService>,
}

impl Submitter {
    pub fn new(
        persistence: Arc<dyn PersistenceService>,
        notifier: Arc<dyn NotificationService>,
    ) -> Self {
        Self {
            persistence,
            notifier,
        }
    }

    pub async fn submit_application(&self, record: &ApplicationRecord) -> SubmissionOutcome {
        info!("Submitting application {}", record.id);
        let saved = self.persistence.save_application(record).await;
        let data = serde_json::to_value(record);
        self.settle(saved, NotificationKind::Application, data, RECEIVED_MESSAGE)
            .await
    }

    pub async fn submit_contact_message(&self, message: &ContactMessage) -> SubmissionOutcome {
        info!("Submitting contact message from {}", message.email);
        let saved = self.persistence.save_contact_message(message).await;
        let data = serde_json::to_value(message);
        self.settle(saved, NotificationKind::Contact, data, CONTACT_RECEIVED_MESSAGE)
            .await
    }

    async fn settle(
        &self,
        saved: PortResult<SaveReceipt>,
        kind: NotificationKind,
        data: Result<serde_json::Value, serde_json::Error>,
        received_message: &str,
    ) -> SubmissionOutcome {
        let receipt = match saved {
            Ok(receipt) => receipt,
            Err(e) => {
                error!("Unexpected error while saving {:?} submission: {}", kind, e);
                return SubmissionOutcome::Received {
                    message: received_message.to_string(),
                };
            }
        };
        if !receipt.success {
            let message = receipt
                .error
                .unwrap_or_else(|| "Failed to save your submission. Please try again.".to_string());
            warn!("Persistence rejected {:?} submission: {}", kind, message);
            return SubmissionOutcome::Failed { message };
        }

        match data {
            Ok(data) => self.notify(Notification { kind, data }).await,
            Err(e) => warn!("Could not serialize {:?} notification: {}", kind, e),
        }
        SubmissionOutcome::Submitted { id: receipt.id }
    }

    /// Email delivery is best effort.
    async fn notify(&self, notification: Notification) {
        match self.notifier.notify(&notification).await {
            Ok(receipt) if receipt.success => {
                info!("{:?} notification delivered", notification.kind);
            }
            Ok(_) => warn!(
                "{:?} notification was not accepted by the endpoint",
                notification.kind
            ),
            Err(e) => warn!("{:?} notification failed: {}", notification.kind, e),
        }
    }
}
