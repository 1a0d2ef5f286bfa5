//! crates/recruit_core/src/domain.rs
//!
//! Defines the pure, core data structures for the recruitment flow.
//! These structs are independent of any database or transport.

use crate::validation::{not_blank, validate_phone, validate_year};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

//=========================================================================================
// Candidate Input
//=========================================================================================

/// The basic-information form filled in on the first wizard step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PersonalInfo {
    #[validate(custom = "not_blank", length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(custom = "validate_phone")]
    pub phone: String,
    #[validate(custom = "not_blank")]
    pub branch: String,
    #[validate(custom = "validate_year")]
    pub year: String,
    #[validate(custom = "not_blank")]
    pub college: String,
    #[validate(custom = "not_blank")]
    pub preferred_role: String,
    #[validate(custom = "not_blank")]
    pub experience: String,
    #[validate(
        custom = "not_blank",
        length(min = 20, message = "Tell us a little more (at least 20 characters)")
    )]
    pub motivation: String,
}

/// Opaque handle to an uploaded resume. The bytes live with the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResumeFileRef(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewMode {
    Online,
    Offline,
}

/// A bookable interview slot. Selecting a new slot replaces the previous one wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub date: NaiveDate,
    pub time: String,
    pub available: bool,
    pub mode: InterviewMode,
}

//=========================================================================================
// Assessment Data
//=========================================================================================

/// A single multiple-choice question from the fixed question bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option_index: usize,
    pub category: String,
}

/// The verdict produced once, when an assessment completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub score_percent: u8,
    pub correct_count: u32,
    pub total_questions: u32,
    pub elapsed_seconds: u32,
    pub passed: bool,
}

//=========================================================================================
// Application Record
//=========================================================================================

/// The accumulated state of one candidate's journey through the wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub personal_info: PersonalInfo,
    pub personal_info_valid: bool,
    pub quiz_result: Option<AssessmentResult>,
    pub resume_file_ref: Option<ResumeFileRef>,
    pub interview_slot: Option<Slot>,
}

impl ApplicationRecord {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            personal_info: PersonalInfo::default(),
            personal_info_valid: false,
            quiz_result: None,
            resume_file_ref: None,
            interview_slot: None,
        }
    }

    /// Replaces exactly the slice of the record owned by the given step.
    pub fn apply(&mut self, update: StepUpdate) {
        match update {
            StepUpdate::PersonalInfo(info) => {
                self.personal_info_valid = info.validate().is_ok();
                self.personal_info = info;
            }
            StepUpdate::QuizResult(result) => self.quiz_result = Some(result),
            StepUpdate::Resume(file_ref) => self.resume_file_ref = Some(file_ref),
            StepUpdate::InterviewSlot(slot) => self.interview_slot = Some(slot),
        }
    }
}

impl Default for ApplicationRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// A partial update emitted by one wizard step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "slice", content = "value", rename_all = "snake_case")]
pub enum StepUpdate {
    PersonalInfo(PersonalInfo),
    QuizResult(AssessmentResult),
    Resume(ResumeFileRef),
    InterviewSlot(Slot),
}

//=========================================================================================
// Contact Form & Notifications
//=========================================================================================

/// A message sent through the public contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct ContactMessage {
    #[validate(custom = "not_blank")]
    pub name: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    pub subject: String,
    #[validate(length(min = 10, message = "Message must be at least 10 characters"))]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Contact,
    Application,
}

/// The payload handed to the notification collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub data: serde_json::Value,
}
