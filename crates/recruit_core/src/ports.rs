//! crates/recruit_core/src/ports.rs
//!
//! Defines the service contracts (traits) the recruitment core talks through.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! wizard and the assessment independent of any database or HTTP client.

use crate::domain::{ApplicationRecord, AssessmentQuestion, ContactMessage, Notification, ResumeFileRef};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Collaborator Receipts
//=========================================================================================

/// What the persistence collaborator reports back for a save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReceipt {
    pub success: bool,
    pub id: Option<String>,
    pub error: Option<String>,
}

impl SaveReceipt {
    pub fn saved(id: impl Into<String>) -> Self {
        Self {
            success: true,
            id: Some(id.into()),
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            id: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyReceipt {
    pub success: bool,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait PersistenceService: Send + Sync {
    async fn save_application(&self, record: &ApplicationRecord) -> PortResult<SaveReceipt>;

    async fn save_contact_message(&self, message: &ContactMessage) -> PortResult<SaveReceipt>;

    /// Stores an uploaded resume and hands back an opaque reference to it.
    async fn store_resume(
        &self,
        file_name: &str,
        content_type: &str,
        content: &[u8],
    ) -> PortResult<ResumeFileRef>;
}

#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Delivers a contact or application notification (email) to the team.
    async fn notify(&self, notification: &Notification) -> PortResult<NotifyReceipt>;
}

#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Returns the fixed, ordered question bank for the technical quiz.
    async fn load_questions(&self) -> PortResult<Vec<AssessmentQuestion>>;
}
