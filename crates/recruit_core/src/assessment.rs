//! crates/recruit_core/src/assessment.rs
//!
//! The timed technical quiz embedded in the second wizard step.
//!
//! Every transition is a plain method on `Assessment`. The countdown is driven
//! from outside: a scheduler calls `tick()` once per second while the quiz is in
//! progress, and the tick that reaches zero completes the quiz on its own.

use crate::domain::{AssessmentQuestion, AssessmentResult};
use serde::Serialize;

pub const DEFAULT_TIME_LIMIT_SECS: u32 = 1800;
pub const DEFAULT_PASS_PERCENT: u8 = 70;
pub const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssessmentConfig {
    pub time_limit_secs: u32,
    pub pass_percent: u8,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            pass_percent: DEFAULT_PASS_PERCENT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentPhase {
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssessmentError {
    #[error("The question bank is empty")]
    EmptyQuestionBank,
    #[error("Question {index} is malformed: {reason}")]
    MalformedQuestion { index: usize, reason: String },
    #[error("Invalid assessment configuration: {0}")]
    InvalidConfig(String),
    #[error("Operation requires phase {expected:?}, but the assessment is {actual:?}")]
    WrongPhase {
        expected: AssessmentPhase,
        actual: AssessmentPhase,
    },
    #[error("Option {option} does not exist; the question has {available} options")]
    OptionOutOfRange { option: usize, available: usize },
}

/// What a single countdown tick did to the assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The quiz was not running; nothing changed.
    Idle,
    Running { remaining_seconds: u32 },
    /// The clock hit zero and the quiz was completed automatically.
    TimedOut(AssessmentResult),
}

//=========================================================================================
// The Sub-machine
//=========================================================================================

#[derive(Debug, Clone)]
pub struct Assessment {
    questions: Vec<AssessmentQuestion>,
    config: AssessmentConfig,
    current_index: usize,
    selected_answers: Vec<Option<usize>>,
    remaining_seconds: u32,
    phase: AssessmentPhase,
    result: Option<AssessmentResult>,
}

impl Assessment {
    /// Builds a quiz over a fixed, ordered question bank.
    pub fn new(
        questions: Vec<AssessmentQuestion>,
        config: AssessmentConfig,
    ) -> Result<Self, AssessmentError> {
        if questions.is_empty() {
            return Err(AssessmentError::EmptyQuestionBank);
        }
        if config.time_limit_secs == 0 {
            return Err(AssessmentError::InvalidConfig(
                "time limit must be positive".to_string(),
            ));
        }
        if config.pass_percent > 100 {
            return Err(AssessmentError::InvalidConfig(format!(
                "pass threshold {} is above 100",
                config.pass_percent
            )));
        }
        for (index, question) in questions.iter().enumerate() {
            if question.options.len() != OPTIONS_PER_QUESTION {
                return Err(AssessmentError::MalformedQuestion {
                    index,
                    reason: format!(
                        "expected {} options, found {}",
                        OPTIONS_PER_QUESTION,
                        question.options.len()
                    ),
                });
            }
            if question.correct_option_index >= OPTIONS_PER_QUESTION {
                return Err(AssessmentError::MalformedQuestion {
                    index,
                    reason: format!(
                        "correct option {} is out of range",
                        question.correct_option_index
                    ),
                });
            }
        }

        let count = questions.len();
        Ok(Self {
            questions,
            config,
            current_index: 0,
            selected_answers: vec![None; count],
            remaining_seconds: config.time_limit_secs,
            phase: AssessmentPhase::NotStarted,
            result: None,
        })
    }

    pub fn phase(&self) -> AssessmentPhase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn selected_answers(&self) -> &[Option<usize>] {
        &self.selected_answers
    }

    pub fn answered_count(&self) -> usize {
        self.selected_answers.iter().filter(|a| a.is_some()).count()
    }

    pub fn result(&self) -> Option<AssessmentResult> {
        self.result
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }

    fn require_phase(&self, expected: AssessmentPhase) -> Result<(), AssessmentError> {
        if self.phase != expected {
            return Err(AssessmentError::WrongPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), AssessmentError> {
        self.require_phase(AssessmentPhase::NotStarted)?;
        self.selected_answers = vec![None; self.questions.len()];
        self.remaining_seconds = self.config.time_limit_secs;
        self.current_index = 0;
        self.phase = AssessmentPhase::InProgress;
        Ok(())
    }

    /// Records the answer for the current question, replacing any earlier choice.
    pub fn select_answer(&mut self, option_index: usize) -> Result<(), AssessmentError> {
        self.require_phase(AssessmentPhase::InProgress)?;
        let available = self.questions[self.current_index].options.len();
        if option_index >= available {
            return Err(AssessmentError::OptionOutOfRange {
                option: option_index,
                available,
            });
        }
        self.selected_answers[self.current_index] = Some(option_index);
        Ok(())
    }

    pub fn go_to_next(&mut self) -> Result<usize, AssessmentError> {
        self.go_to(self.current_index.saturating_add(1))
    }

    pub fn go_to_previous(&mut self) -> Result<usize, AssessmentError> {
        self.go_to(self.current_index.saturating_sub(1))
    }

    /// Jumps to a question, clamped to the bank. Unanswered questions may be skipped.
    pub fn go_to(&mut self, index: usize) -> Result<usize, AssessmentError> {
        self.require_phase(AssessmentPhase::InProgress)?;
        self.current_index = index.min(self.questions.len() - 1);
        Ok(self.current_index)
    }

    /// Scores the quiz and moves it to `Completed`. Only valid once.
    pub fn complete(&mut self) -> Result<AssessmentResult, AssessmentError> {
        self.require_phase(AssessmentPhase::InProgress)?;
        Ok(self.finish())
    }

    /// Advances the countdown by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != AssessmentPhase::InProgress {
            return TickOutcome::Idle;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            return TickOutcome::TimedOut(self.finish());
        }
        TickOutcome::Running {
            remaining_seconds: self.remaining_seconds,
        }
    }

    fn finish(&mut self) -> AssessmentResult {
        let correct_count = self
            .questions
            .iter()
            .zip(&self.selected_answers)
            .filter(|(question, answer)| **answer == Some(question.correct_option_index))
            .count() as u32;
        let total_questions = self.questions.len() as u32;
        let score_percent = score_percent(correct_count, total_questions);
        let result = AssessmentResult {
            score_percent,
            correct_count,
            total_questions,
            elapsed_seconds: self.config.time_limit_secs - self.remaining_seconds,
            passed: score_percent >= self.config.pass_percent,
        };
        self.phase = AssessmentPhase::Completed;
        self.result = Some(result);
        result
    }

    /// A client-facing snapshot. The answer key is never included.
    pub fn view(&self) -> AssessmentView {
        let question = match self.phase {
            AssessmentPhase::InProgress => {
                let q = &self.questions[self.current_index];
                Some(QuestionView {
                    prompt: q.prompt.clone(),
                    options: q.options.clone(),
                    category: q.category.clone(),
                })
            }
            _ => None,
        };
        AssessmentView {
            phase: self.phase,
            current_index: self.current_index,
            total_questions: self.questions.len(),
            question,
            selected_answer: self.selected_answers[self.current_index],
            answered_count: self.answered_count(),
            remaining_seconds: self.remaining_seconds,
            result: self.result,
        }
    }
}

/// Half-up rounding of `100 * correct / total`.
fn score_percent(correct: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    ((200 * correct + total) / (2 * total)).min(100) as u8
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub prompt: String,
    pub options: Vec<String>,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssessmentView {
    pub phase: AssessmentPhase,
    pub current_index: usize,
    pub total_questions: usize,
    pub question: Option<QuestionView>,
    pub selected_answer: Option<usize>,
    pub answered_count: usize,
    pub remaining_seconds: u32,
    pub result: Option<AssessmentResult>,
}
