//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `PersistenceService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use recruit_core::domain::{ApplicationRecord, ContactMessage, ResumeFileRef};
use recruit_core::ports::{PersistenceService, PortError, PortResult, SaveReceipt};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `PersistenceService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// `PersistenceService` Trait Implementation
//=========================================================================================

#[async_trait]
impl PersistenceService for DbAdapter {
    async fn save_application(&self, record: &ApplicationRecord) -> PortResult<SaveReceipt> {
        let passed_quiz = record.quiz_result.map(|r| r.passed);
        let result = sqlx::query(
            "INSERT INTO applications (id, email, record, passed_quiz) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO UPDATE SET record = EXCLUDED.record, passed_quiz = EXCLUDED.passed_quiz",
        )
        .bind(record.id)
        .bind(&record.personal_info.email)
        .bind(Json(record))
        .bind(passed_quiz)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(SaveReceipt::saved(record.id.to_string())),
            Err(e) => {
                error!("Failed to save application {}: {}", record.id, e);
                Ok(SaveReceipt::rejected(
                    "We could not save your application. Please try again.",
                ))
            }
        }
    }

    async fn save_contact_message(&self, message: &ContactMessage) -> PortResult<SaveReceipt> {
        let id = Uuid::new_v4();
        let result = sqlx::query(
            "INSERT INTO contact_messages (id, name, email, subject, message) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.subject)
        .bind(&message.message)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(SaveReceipt::saved(id.to_string())),
            Err(e) => {
                error!("Failed to save contact message {}: {}", id, e);
                Ok(SaveReceipt::rejected(
                    "We could not save your message. Please try again.",
                ))
            }
        }
    }

    async fn store_resume(
        &self,
        file_name: &str,
        content_type: &str,
        content: &[u8],
    ) -> PortResult<ResumeFileRef> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO resumes (id, file_name, content_type, content) VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(file_name)
        .bind(content_type)
        .bind(content)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(ResumeFileRef(format!("resumes/{}", id)))
    }
}
