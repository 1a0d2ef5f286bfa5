//! services/api/src/web/session.rs
//!
//! The state owned by one WebSocket connection: the wizard, the quiz
//! sub-machine for the quiz step, and the token of the running countdown.
//!
//! `SessionState::apply` turns each client message into replies plus the side
//! effects the connection loop has to carry out. Every message is applied under
//! the session lock, so ticks and answers never interleave mid-update.

use crate::web::protocol::{ClientMessage, ServerMessage};
use chrono::{NaiveDate, Utc};
use recruit_core::assessment::{Assessment, AssessmentConfig, AssessmentPhase, TickOutcome};
use recruit_core::domain::{ApplicationRecord, AssessmentQuestion, AssessmentResult, StepUpdate};
use recruit_core::ports::{PortError, PortResult};
use recruit_core::schedule::offered_slot;
use recruit_core::submission::SubmissionOutcome;
use recruit_core::validation::validate_personal_info;
use recruit_core::wizard::{GatingPolicy, MergeOutcome, Wizard, WizardError, WizardStep};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Work the connection loop must do after a message has been applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartCountdown,
    StopCountdown,
    Submit(ApplicationRecord),
}

#[derive(Debug, Default)]
pub struct Reaction {
    pub replies: Vec<ServerMessage>,
    pub effects: Vec<Effect>,
}

impl Reaction {
    fn error(message: impl Into<String>) -> Self {
        Self {
            replies: vec![ServerMessage::Error {
                message: message.into(),
            }],
            effects: Vec::new(),
        }
    }
}

/// The state for a single, active WebSocket connection.
pub struct SessionState {
    pub wizard: Wizard,
    pub assessment: Assessment,
    questions: Vec<AssessmentQuestion>,
    assessment_config: AssessmentConfig,
    /// A token to cancel the running quiz countdown.
    pub cancellation_token: CancellationToken,
    /// The day slot offers are computed from.
    today: fn() -> NaiveDate,
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

impl SessionState {
    pub fn new(
        questions: Vec<AssessmentQuestion>,
        assessment_config: AssessmentConfig,
        policy: GatingPolicy,
    ) -> PortResult<Self> {
        let assessment = Assessment::new(questions.clone(), assessment_config)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(Self {
            wizard: Wizard::new(policy),
            assessment,
            questions,
            assessment_config,
            cancellation_token: CancellationToken::new(),
            today: utc_today,
        })
    }

    pub fn apply(&mut self, msg: ClientMessage) -> Reaction {
        match msg {
            ClientMessage::Advance => self.navigate(Wizard::advance),
            ClientMessage::Retreat => self.navigate(Wizard::retreat),
            ClientMessage::UpdatePersonalInfo { personal_info } => {
                let errors = validate_personal_info(&personal_info).err();
                if let Err(message) = self.merge_own(StepUpdate::PersonalInfo(personal_info)) {
                    return Reaction::error(message);
                }
                let mut reaction = self.wizard_snapshot();
                if let Some(errors) = errors {
                    reaction
                        .replies
                        .push(ServerMessage::ValidationFailed { errors });
                }
                reaction
            }
            ClientMessage::StartQuiz => self.start_quiz(),
            ClientMessage::SelectAnswer { option_index } => {
                self.quiz_op(|quiz| quiz.select_answer(option_index))
            }
            ClientMessage::NextQuestion => self.quiz_op(|quiz| quiz.go_to_next().map(|_| ())),
            ClientMessage::PreviousQuestion => {
                self.quiz_op(|quiz| quiz.go_to_previous().map(|_| ()))
            }
            ClientMessage::GoToQuestion { index } => {
                self.quiz_op(|quiz| quiz.go_to(index).map(|_| ()))
            }
            ClientMessage::CompleteQuiz => match self.assessment.complete() {
                Ok(result) => {
                    let mut reaction = self.record_quiz_result(result, false);
                    reaction.effects.push(Effect::StopCountdown);
                    reaction
                }
                Err(e) => Reaction::error(e.to_string()),
            },
            ClientMessage::AttachResume { file_ref } => {
                match self.merge_own(StepUpdate::Resume(file_ref)) {
                    Ok(_) => self.wizard_snapshot(),
                    Err(message) => Reaction::error(message),
                }
            }
            ClientMessage::ChooseSlot { slot } => {
                // Only slots from the current offer can be booked.
                let Some(slot) = offered_slot(&slot, (self.today)()) else {
                    warn!(
                        "Rejected slot {} {} outside the offer for application {}",
                        slot.date,
                        slot.time,
                        self.wizard.record().id
                    );
                    return Reaction::error(WizardError::SlotUnavailable.to_string());
                };
                match self.merge_own(StepUpdate::InterviewSlot(slot)) {
                    Ok(MergeOutcome::SubmissionDue) => {
                        let mut reaction = self.wizard_snapshot();
                        reaction
                            .effects
                            .push(Effect::Submit(self.wizard.record().clone()));
                        reaction
                    }
                    Ok(MergeOutcome::Merged) => self.wizard_snapshot(),
                    Err(message) => Reaction::error(message),
                }
            }
            ClientMessage::RetrySubmission => match self.wizard.begin_retry() {
                Some(record) => {
                    let mut reaction = self.wizard_snapshot();
                    reaction.effects.push(Effect::Submit(record));
                    reaction
                }
                None => Reaction::error("There is no failed submission to retry."),
            },
        }
    }

    /// One second of countdown. A timeout merges the result like a normal completion.
    pub fn tick_quiz(&mut self) -> (TickOutcome, Vec<ServerMessage>) {
        let outcome = self.assessment.tick();
        let replies = match outcome {
            TickOutcome::Idle => Vec::new(),
            TickOutcome::Running { remaining_seconds } => {
                vec![ServerMessage::QuizTick { remaining_seconds }]
            }
            TickOutcome::TimedOut(result) => {
                info!("Quiz timed out for application {}", self.wizard.record().id);
                self.record_quiz_result(result, true).replies
            }
        };
        (outcome, replies)
    }

    pub fn finish_submission(&mut self, outcome: SubmissionOutcome) -> Vec<ServerMessage> {
        self.wizard.finish_submission(&outcome);
        let mut replies = vec![ServerMessage::SubmissionResult { outcome }];
        replies.extend(self.wizard_snapshot().replies);
        replies
    }

    pub fn wizard_snapshot(&self) -> Reaction {
        Reaction {
            replies: vec![ServerMessage::WizardState {
                wizard: self.wizard.view(),
            }],
            effects: Vec::new(),
        }
    }

    /// Steps may only write their own slice of the record.
    fn merge_own(&mut self, update: StepUpdate) -> Result<MergeOutcome, String> {
        if update.owner() != self.wizard.step() {
            return Err(format!(
                "This update belongs to step {}, but the wizard is on step {}",
                update.owner().number(),
                self.wizard.step().number()
            ));
        }
        self.wizard.merge(update).map_err(|e| e.to_string())
    }

    fn navigate(
        &mut self,
        step_fn: fn(&mut Wizard) -> Result<WizardStep, WizardError>,
    ) -> Reaction {
        let from = self.wizard.step();
        if let Err(e) = step_fn(&mut self.wizard) {
            return Reaction::error(e.to_string());
        }
        let mut reaction = self.wizard_snapshot();
        if from == WizardStep::TechnicalQuiz && self.assessment.phase() == AssessmentPhase::InProgress
        {
            // Leaving the quiz step tears the running quiz down.
            warn!(
                "Quiz abandoned mid-way for application {}",
                self.wizard.record().id
            );
            self.reset_assessment();
            reaction.effects.push(Effect::StopCountdown);
        }
        reaction
    }

    fn reset_assessment(&mut self) {
        // The bank was validated when the session was built.
        if let Ok(fresh) = Assessment::new(self.questions.clone(), self.assessment_config) {
            self.assessment = fresh;
        }
    }

    fn start_quiz(&mut self) -> Reaction {
        if self.wizard.step() != WizardStep::TechnicalQuiz {
            return Reaction::error("The quiz can only be started on the technical quiz step.");
        }
        if self.wizard.record().quiz_result.is_some() {
            return Reaction::error("The quiz has already been completed.");
        }
        if self.wizard.is_locked() {
            return Reaction::error(WizardError::RecordLocked.to_string());
        }
        match self.assessment.start() {
            Ok(()) => Reaction {
                replies: vec![ServerMessage::QuizState {
                    quiz: self.assessment.view(),
                }],
                effects: vec![Effect::StartCountdown],
            },
            Err(e) => Reaction::error(e.to_string()),
        }
    }

    fn quiz_op<F>(&mut self, op: F) -> Reaction
    where
        F: FnOnce(&mut Assessment) -> Result<(), recruit_core::assessment::AssessmentError>,
    {
        match op(&mut self.assessment) {
            Ok(()) => Reaction {
                replies: vec![ServerMessage::QuizState {
                    quiz: self.assessment.view(),
                }],
                effects: Vec::new(),
            },
            Err(e) => Reaction::error(e.to_string()),
        }
    }

    fn record_quiz_result(&mut self, result: AssessmentResult, timed_out: bool) -> Reaction {
        if let Err(e) = self.wizard.merge(StepUpdate::QuizResult(result)) {
            warn!("Failed to merge quiz result: {}", e);
        }
        let mut reaction = Reaction {
            replies: vec![ServerMessage::QuizCompleted { result, timed_out }],
            effects: Vec::new(),
        };
        reaction.replies.extend(self.wizard_snapshot().replies);
        reaction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::questions::default_questions;
    use recruit_core::domain::{InterviewMode, PersonalInfo, ResumeFileRef, Slot};
    use recruit_core::wizard::SubmissionStatus;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn session() -> SessionState {
        let mut session = SessionState::new(
            default_questions(),
            AssessmentConfig::default(),
            GatingPolicy::Free,
        )
        .unwrap();
        session.today = monday;
        session
    }

    fn on_last_step() -> SessionState {
        let mut session = session();
        for _ in 0..3 {
            session.apply(ClientMessage::Advance);
        }
        session
    }

    fn slot() -> Slot {
        Slot {
            date: NaiveDate::from_ymd_opt(2026, 10, 22).unwrap(),
            time: "16:00".into(),
            available: true,
            mode: InterviewMode::Online,
        }
    }

    fn has_error(reaction: &Reaction) -> bool {
        reaction
            .replies
            .iter()
            .any(|r| matches!(r, ServerMessage::Error { .. }))
    }

    #[test]
    fn empty_question_bank_is_rejected() {
        assert!(SessionState::new(vec![], AssessmentConfig::default(), GatingPolicy::Free).is_err());
    }

    #[test]
    fn invalid_personal_info_is_merged_and_reported() {
        let mut session = session();
        let reaction = session.apply(ClientMessage::UpdatePersonalInfo {
            personal_info: PersonalInfo {
                name: "Z".into(),
                ..PersonalInfo::default()
            },
        });
        assert!(matches!(reaction.replies[0], ServerMessage::WizardState { .. }));
        assert!(matches!(
            reaction.replies[1],
            ServerMessage::ValidationFailed { .. }
        ));
        assert_eq!(session.wizard.record().personal_info.name, "Z");
        assert!(!session.wizard.record().personal_info_valid);
    }

    #[test]
    fn quiz_only_starts_on_its_step() {
        let mut session = session();
        assert!(has_error(&session.apply(ClientMessage::StartQuiz)));

        session.apply(ClientMessage::Advance);
        let reaction = session.apply(ClientMessage::StartQuiz);
        assert_eq!(reaction.effects, vec![Effect::StartCountdown]);
        assert_eq!(session.assessment.phase(), AssessmentPhase::InProgress);
    }

    #[test]
    fn completing_the_quiz_merges_the_result() {
        let mut session = session();
        session.apply(ClientMessage::Advance);
        session.apply(ClientMessage::StartQuiz);
        session.apply(ClientMessage::SelectAnswer { option_index: 1 });
        let reaction = session.apply(ClientMessage::CompleteQuiz);

        assert_eq!(reaction.effects, vec![Effect::StopCountdown]);
        let result = session.wizard.record().quiz_result.unwrap();
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.total_questions, 10);
        assert!(!result.passed);

        // A finished quiz cannot be retaken.
        assert!(has_error(&session.apply(ClientMessage::StartQuiz)));
        assert!(has_error(&session.apply(ClientMessage::CompleteQuiz)));
    }

    #[test]
    fn leaving_a_running_quiz_tears_it_down() {
        let mut session = session();
        session.apply(ClientMessage::Advance);
        session.apply(ClientMessage::StartQuiz);
        session.apply(ClientMessage::SelectAnswer { option_index: 0 });

        let reaction = session.apply(ClientMessage::Advance);
        assert_eq!(reaction.effects, vec![Effect::StopCountdown]);
        assert_eq!(session.assessment.phase(), AssessmentPhase::NotStarted);
        assert_eq!(session.assessment.answered_count(), 0);
        assert!(session.wizard.record().quiz_result.is_none());
        assert_eq!(session.assessment.tick(), TickOutcome::Idle);
    }

    #[test]
    fn timeout_through_ticks_records_result() {
        let mut session = SessionState::new(
            default_questions(),
            AssessmentConfig {
                time_limit_secs: 2,
                pass_percent: 70,
            },
            GatingPolicy::Free,
        )
        .unwrap();
        session.apply(ClientMessage::Advance);
        session.apply(ClientMessage::StartQuiz);

        let (outcome, replies) = session.tick_quiz();
        assert_eq!(outcome, TickOutcome::Running { remaining_seconds: 1 });
        assert!(matches!(replies[0], ServerMessage::QuizTick { remaining_seconds: 1 }));

        let (outcome, replies) = session.tick_quiz();
        assert!(matches!(outcome, TickOutcome::TimedOut(_)));
        assert!(matches!(
            replies[0],
            ServerMessage::QuizCompleted { timed_out: true, .. }
        ));
        assert_eq!(
            session.wizard.record().quiz_result.unwrap().elapsed_seconds,
            2
        );
    }

    #[test]
    fn steps_cannot_write_other_slices() {
        let mut session = session();
        let reaction = session.apply(ClientMessage::AttachResume {
            file_ref: ResumeFileRef("resumes/1".into()),
        });
        assert!(has_error(&reaction));
        assert!(session.wizard.record().resume_file_ref.is_none());
    }

    #[test]
    fn choosing_a_slot_on_the_last_step_submits_once() {
        let mut session = session();
        for _ in 0..2 {
            session.apply(ClientMessage::Advance);
        }
        session.apply(ClientMessage::AttachResume {
            file_ref: ResumeFileRef("resumes/1".into()),
        });
        session.apply(ClientMessage::Advance);

        let reaction = session.apply(ClientMessage::ChooseSlot { slot: slot() });
        assert!(matches!(reaction.effects.as_slice(), [Effect::Submit(record)] if record.interview_slot == Some(slot())));

        let again = session.apply(ClientMessage::ChooseSlot { slot: slot() });
        assert!(again.effects.is_empty());

        let replies = session.finish_submission(SubmissionOutcome::Failed {
            message: "db down".into(),
        });
        assert!(matches!(replies[0], ServerMessage::SubmissionResult { .. }));

        let retry = session.apply(ClientMessage::RetrySubmission);
        assert_eq!(retry.effects.len(), 1);
        assert_eq!(session.wizard.submission(), &SubmissionStatus::InFlight);

        session.finish_submission(SubmissionOutcome::Submitted { id: None });
        assert!(session.wizard.is_complete());
        assert!(has_error(&session.apply(ClientMessage::RetrySubmission)));
    }

    #[test]
    fn slots_outside_the_offer_are_refused() {
        let mut session = on_last_step();
        let reaction = session.apply(ClientMessage::ChooseSlot {
            slot: Slot {
                date: NaiveDate::from_ymd_opt(2020, 1, 5).unwrap(),
                time: "03:00".into(),
                available: true,
                mode: InterviewMode::Online,
            },
        });
        assert!(has_error(&reaction));
        assert!(reaction.effects.is_empty());
        assert!(session.wizard.record().interview_slot.is_none());
        assert_eq!(session.wizard.submission(), &SubmissionStatus::NotSubmitted);

        // Right day and mode, but not an offered time.
        let reaction = session.apply(ClientMessage::ChooseSlot {
            slot: Slot {
                time: "11:30".into(),
                ..slot()
            },
        });
        assert!(has_error(&reaction));
        assert!(reaction.effects.is_empty());
    }

    #[test]
    fn offered_slot_replaces_client_copy() {
        let mut session = on_last_step();
        let reaction = session.apply(ClientMessage::ChooseSlot {
            slot: Slot {
                available: false,
                ..slot()
            },
        });
        assert_eq!(reaction.effects.len(), 1);
        assert_eq!(session.wizard.record().interview_slot, Some(slot()));
    }

    #[test]
    fn submitted_record_rejects_slot_changes() {
        let mut session = on_last_step();
        session.apply(ClientMessage::ChooseSlot { slot: slot() });

        let other = Slot {
            time: "10:00".into(),
            ..slot()
        };
        let in_flight = session.apply(ClientMessage::ChooseSlot { slot: other.clone() });
        assert!(has_error(&in_flight));
        assert!(in_flight.effects.is_empty());

        session.finish_submission(SubmissionOutcome::Submitted {
            id: Some("app-9".into()),
        });
        let after = session.apply(ClientMessage::ChooseSlot { slot: other });
        assert!(has_error(&after));
        assert_eq!(session.wizard.record().interview_slot, Some(slot()));
    }

    #[test]
    fn submitted_record_rejects_personal_info_changes() {
        let mut session = on_last_step();
        session.apply(ClientMessage::ChooseSlot { slot: slot() });
        session.finish_submission(SubmissionOutcome::Submitted { id: None });
        let saved = session.wizard.record().clone();

        for _ in 0..3 {
            session.apply(ClientMessage::Retreat);
        }
        assert_eq!(session.wizard.step(), WizardStep::BasicInformation);
        let reaction = session.apply(ClientMessage::UpdatePersonalInfo {
            personal_info: PersonalInfo {
                name: "Changed Later".into(),
                ..PersonalInfo::default()
            },
        });
        assert!(has_error(&reaction));
        assert_eq!(session.wizard.record(), &saved);

        session.apply(ClientMessage::Advance);
        assert!(has_error(&session.apply(ClientMessage::StartQuiz)));
    }
}
