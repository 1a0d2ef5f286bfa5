//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the API server
//! for the application wizard.

use axum::extract::ws::Message;
use futures::{Sink, SinkExt};
use recruit_core::assessment::AssessmentView;
use recruit_core::domain::{AssessmentResult, PersonalInfo, ResumeFileRef, Slot};
use recruit_core::submission::SubmissionOutcome;
use recruit_core::validation::FieldErrors;
use recruit_core::wizard::WizardView;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::error;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Move to the next wizard step.
    Advance,

    /// Move back one wizard step.
    Retreat,

    /// Replaces the basic-information form. Sent on every change.
    UpdatePersonalInfo { personal_info: PersonalInfo },

    /// Starts the timed technical quiz. Only valid on the quiz step.
    StartQuiz,

    SelectAnswer { option_index: usize },

    NextQuestion,

    PreviousQuestion,

    GoToQuestion { index: usize },

    /// Submits the quiz before the clock runs out.
    CompleteQuiz,

    /// Attaches a resume previously uploaded through `POST /resumes`.
    AttachResume { file_ref: ResumeFileRef },

    /// Chooses the interview slot. On the last step this submits the application.
    ChooseSlot { slot: Slot },

    /// Re-sends an application whose submission failed.
    RetrySubmission,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The full wizard snapshot, sent after every change to it.
    WizardState { wizard: WizardView },

    /// Per-field problems with the basic-information form.
    ValidationFailed { errors: FieldErrors },

    /// The quiz snapshot (current question without the answer key).
    QuizState { quiz: AssessmentView },

    /// One second of the quiz countdown has passed.
    QuizTick { remaining_seconds: u32 },

    QuizCompleted {
        result: AssessmentResult,
        timed_out: bool,
    },

    SubmissionResult { outcome: SubmissionOutcome },

    /// Reports a rejected request to the client, which should display the message.
    Error { message: String },
}

/// Serializes and sends a `ServerMessage`. Returns `false` when the client is gone.
pub async fn send_server_message<S>(ws_sender: &Mutex<S>, msg: &ServerMessage) -> bool
where
    S: Sink<Message> + Unpin,
{
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize server message: {}", e);
            return false;
        }
    };
    ws_sender
        .lock()
        .await
        .send(Message::Text(json.into()))
        .await
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_are_snake_case_tagged() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"select_answer","option_index":2}"#).unwrap();
        assert_eq!(msg, ClientMessage::SelectAnswer { option_index: 2 });

        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"choose_slot","slot":{"date":"2026-10-21","time":"10:00","available":true,"mode":"online"}}"#,
        )
        .unwrap();
        assert!(matches!(msg, ClientMessage::ChooseSlot { slot } if slot.time == "10:00"));

        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"update_personal_info","personal_info":{"name":"Ana"}}"#,
        )
        .unwrap();
        assert!(
            matches!(msg, ClientMessage::UpdatePersonalInfo { personal_info } if personal_info.name == "Ana" && personal_info.email.is_empty())
        );
    }

    #[test]
    fn server_tick_shape() {
        let json = serde_json::to_value(ServerMessage::QuizTick {
            remaining_seconds: 42,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"type": "quiz_tick", "remaining_seconds": 42}));
    }
}
