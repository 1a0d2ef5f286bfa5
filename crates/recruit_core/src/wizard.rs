//! crates/recruit_core/src/wizard.rs
//!
//! The application wizard controller: four fixed steps, one accumulated
//! `ApplicationRecord`, and the gate that triggers final submission exactly once.

use crate::domain::{ApplicationRecord, StepUpdate};
use crate::submission::SubmissionOutcome;
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    BasicInformation,
    TechnicalQuiz,
    ResumeUpload,
    InterviewSchedule,
}

impl WizardStep {
    pub const FIRST: WizardStep = WizardStep::BasicInformation;
    pub const LAST: WizardStep = WizardStep::InterviewSchedule;

    /// 1-based position shown to the candidate.
    pub fn number(self) -> u8 {
        match self {
            WizardStep::BasicInformation => 1,
            WizardStep::TechnicalQuiz => 2,
            WizardStep::ResumeUpload => 3,
            WizardStep::InterviewSchedule => 4,
        }
    }

    pub fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::BasicInformation => Some(WizardStep::TechnicalQuiz),
            WizardStep::TechnicalQuiz => Some(WizardStep::ResumeUpload),
            WizardStep::ResumeUpload => Some(WizardStep::InterviewSchedule),
            WizardStep::InterviewSchedule => None,
        }
    }

    pub fn previous(self) -> Option<WizardStep> {
        match self {
            WizardStep::BasicInformation => None,
            WizardStep::TechnicalQuiz => Some(WizardStep::BasicInformation),
            WizardStep::ResumeUpload => Some(WizardStep::TechnicalQuiz),
            WizardStep::InterviewSchedule => Some(WizardStep::ResumeUpload),
        }
    }
}

impl StepUpdate {
    /// The wizard step that owns this slice of the record.
    pub fn owner(&self) -> WizardStep {
        match self {
            StepUpdate::PersonalInfo(_) => WizardStep::BasicInformation,
            StepUpdate::QuizResult(_) => WizardStep::TechnicalQuiz,
            StepUpdate::Resume(_) => WizardStep::ResumeUpload,
            StepUpdate::InterviewSlot(_) => WizardStep::InterviewSchedule,
        }
    }
}

/// Whether `advance()` looks at the validity of the basic-information step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GatingPolicy {
    /// Navigate freely; invalid fields are only surfaced inline.
    #[default]
    Free,
    /// Refuse to leave the first step until the personal info validates.
    RequireValidPersonalInfo,
}

impl FromStr for GatingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(GatingPolicy::Free),
            "require_valid_info" => Ok(GatingPolicy::RequireValidPersonalInfo),
            other => Err(format!(
                "'{}' is not a gating policy (expected 'free' or 'require_valid_info')",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("Already on the last step")]
    AtLastStep,
    #[error("Already on the first step")]
    AtFirstStep,
    #[error("Basic information is incomplete or invalid")]
    InvalidPersonalInfo,
    #[error("The selected interview slot is no longer available")]
    SlotUnavailable,
    #[error("The application has already been submitted and can no longer change")]
    RecordLocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged,
    /// The merge completed the application; the caller must submit it now.
    SubmissionDue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionStatus {
    NotSubmitted,
    InFlight,
    Submitted { id: Option<String> },
    Failed { message: String },
}

//=========================================================================================
// The Controller
//=========================================================================================

#[derive(Debug, Clone)]
pub struct Wizard {
    step: WizardStep,
    record: ApplicationRecord,
    policy: GatingPolicy,
    submission: SubmissionStatus,
}

impl Wizard {
    pub fn new(policy: GatingPolicy) -> Self {
        Self {
            step: WizardStep::FIRST,
            record: ApplicationRecord::new(),
            policy,
            submission: SubmissionStatus::NotSubmitted,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn record(&self) -> &ApplicationRecord {
        &self.record
    }

    pub fn submission(&self) -> &SubmissionStatus {
        &self.submission
    }

    /// The record is frozen while a submission is in flight and after it succeeded.
    pub fn is_locked(&self) -> bool {
        matches!(
            self.submission,
            SubmissionStatus::InFlight | SubmissionStatus::Submitted { .. }
        )
    }

    pub fn advance(&mut self) -> Result<WizardStep, WizardError> {
        let next = self.step.next().ok_or(WizardError::AtLastStep)?;
        if self.policy == GatingPolicy::RequireValidPersonalInfo
            && self.step == WizardStep::BasicInformation
            && !self.record.personal_info_valid
        {
            return Err(WizardError::InvalidPersonalInfo);
        }
        self.step = next;
        Ok(next)
    }

    pub fn retreat(&mut self) -> Result<WizardStep, WizardError> {
        let previous = self.step.previous().ok_or(WizardError::AtFirstStep)?;
        self.step = previous;
        Ok(previous)
    }

    /// Merges one step's slice into the record.
    ///
    /// Returns `SubmissionDue` the first time an interview slot lands while the
    /// wizard sits on its last step; the submission is then marked in flight.
    /// A locked record refuses every update.
    pub fn merge(&mut self, update: StepUpdate) -> Result<MergeOutcome, WizardError> {
        if self.is_locked() {
            return Err(WizardError::RecordLocked);
        }
        let is_slot = match &update {
            StepUpdate::InterviewSlot(slot) if !slot.available => {
                return Err(WizardError::SlotUnavailable)
            }
            StepUpdate::InterviewSlot(_) => true,
            _ => false,
        };
        self.record.apply(update);

        if is_slot
            && self.step == WizardStep::LAST
            && self.submission == SubmissionStatus::NotSubmitted
        {
            self.submission = SubmissionStatus::InFlight;
            return Ok(MergeOutcome::SubmissionDue);
        }
        Ok(MergeOutcome::Merged)
    }

    /// Manual retry after a failed submission.
    ///
    /// Hands back a snapshot of the record to submit, or `None` when the
    /// application is not ready, already in flight, or already submitted.
    pub fn begin_retry(&mut self) -> Option<ApplicationRecord> {
        let ready = self.step == WizardStep::LAST && self.record.interview_slot.is_some();
        match self.submission {
            SubmissionStatus::Failed { .. } | SubmissionStatus::NotSubmitted if ready => {
                self.submission = SubmissionStatus::InFlight;
                Some(self.record.clone())
            }
            _ => None,
        }
    }

    pub fn finish_submission(&mut self, outcome: &SubmissionOutcome) {
        self.submission = match outcome {
            SubmissionOutcome::Submitted { id } => SubmissionStatus::Submitted { id: id.clone() },
            SubmissionOutcome::Received { .. } => SubmissionStatus::Submitted { id: None },
            SubmissionOutcome::Failed { message } => SubmissionStatus::Failed {
                message: message.clone(),
            },
        };
    }

    /// Last step, slot chosen, and submission settled on the success side.
    pub fn is_complete(&self) -> bool {
        self.step == WizardStep::LAST
            && self.record.interview_slot.is_some()
            && matches!(self.submission, SubmissionStatus::Submitted { .. })
    }

    pub fn view(&self) -> WizardView {
        WizardView {
            step: self.step,
            step_number: self.step.number(),
            record: self.record.clone(),
            submission: self.submission.clone(),
        }
    }
}

/// Serializable snapshot handed to the view layer.
#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub step: WizardStep,
    pub step_number: u8,
    pub record: ApplicationRecord,
    pub submission: SubmissionStatus,
}
