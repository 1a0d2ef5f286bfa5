pub mod assessment;
pub mod domain;
pub mod ports;
pub mod schedule;
pub mod submission;
pub mod validation;
pub mod wizard;

pub use assessment::{Assessment, AssessmentConfig, AssessmentError, AssessmentPhase, TickOutcome};
pub use domain::{
    ApplicationRecord, AssessmentQuestion, AssessmentResult, ContactMessage, InterviewMode,
    Notification, NotificationKind, PersonalInfo, ResumeFileRef, Slot, StepUpdate,
};
pub use ports::{
    NotificationService, NotifyReceipt, PersistenceService, PortError, PortResult, QuestionBank,
    SaveReceipt,
};
pub use submission::{SubmissionOutcome, Submitter};
pub use wizard::{GatingPolicy, MergeOutcome, SubmissionStatus, Wizard, WizardError, WizardStep};
