//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a wizard WebSocket connection.
//! It owns the session's state machine and delegates the countdown and the
//! submission to background tasks.

use crate::web::{
    countdown_task::countdown_process,
    protocol::{send_server_message, ClientMessage, ServerMessage},
    session::{Effect, SessionState},
    state::AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::stream::{SplitSink, StreamExt};
use recruit_core::domain::ApplicationRecord;
use std::sync::Arc;
use tokio::{sync::Mutex, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    info!("New wizard connection established.");

    // The sender is wrapped in an Arc<Mutex<>> to allow for shared mutable access across tasks.
    let (sender, mut receiver) = socket.split();
    let ws_sender = Arc::new(Mutex::new(sender));

    // --- 1. Initialization Phase ---
    let session = app_state
        .question_bank
        .load_questions()
        .await
        .and_then(|questions| {
            SessionState::new(
                questions,
                app_state.config.assessment,
                app_state.config.gating_policy,
            )
        });
    let session_state_lock = match session {
        Ok(state) => Arc::new(Mutex::new(state)),
        Err(e) => {
            error!("Failed to initialize wizard session: {:?}", e);
            let err_msg = ServerMessage::Error {
                message: "The application form is unavailable right now.".to_string(),
            };
            let _ = send_server_message(&ws_sender, &err_msg).await;
            return;
        }
    };

    let initial = session_state_lock.lock().await.wizard_snapshot();
    for reply in &initial.replies {
        if !send_server_message(&ws_sender, reply).await {
            error!("Failed to send initial wizard state.");
            return;
        }
    }

    // --- 2. Main Message Loop ---
    let mut countdown_handle: Option<JoinHandle<()>> = None;
    loop {
        match receiver.next().await {
            Some(Ok(Message::Text(text))) => {
                handle_text_message(
                    text.to_string(),
                    &app_state,
                    &session_state_lock,
                    &ws_sender,
                    &mut countdown_handle,
                )
                .await;
            }
            Some(Ok(Message::Close(_))) => {
                info!("Client sent close message.");
                break;
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
            None => {
                info!("Client disconnected.");
                break;
            }
        }
    }

    // --- 3. Cleanup ---
    session_state_lock.lock().await.cancellation_token.cancel();
    if let Some(handle) = countdown_handle {
        handle.abort();
    }
    info!("WebSocket connection closed.");
}

/// Applies one client message and carries out the resulting effects.
async fn handle_text_message(
    text: String,
    app_state: &Arc<AppState>,
    session_state_lock: &Arc<Mutex<SessionState>>,
    ws_sender: &WsSender,
    countdown_handle: &mut Option<JoinHandle<()>>,
) {
    let client_msg = match serde_json::from_str::<ClientMessage>(&text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
            let err_msg = ServerMessage::Error {
                message: "Unrecognized message.".to_string(),
            };
            let _ = send_server_message(ws_sender, &err_msg).await;
            return;
        }
    };

    let mut submissions: Vec<ApplicationRecord> = Vec::new();
    let replies = {
        let mut session = session_state_lock.lock().await;
        let reaction = session.apply(client_msg);
        for effect in reaction.effects {
            match effect {
                Effect::StopCountdown => {
                    info!("Stopping quiz countdown.");
                    session.cancellation_token.cancel();
                }
                Effect::StartCountdown => {
                    session.cancellation_token.cancel();
                    session.cancellation_token = CancellationToken::new();
                    let token = session.cancellation_token.clone();
                    let session_state_lock = session_state_lock.clone();
                    let ws_sender = ws_sender.clone();
                    if let Some(previous) = countdown_handle.take() {
                        previous.abort();
                    }
                    *countdown_handle = Some(tokio::spawn(countdown_process(
                        session_state_lock,
                        ws_sender,
                        token,
                    )));
                }
                Effect::Submit(record) => submissions.push(record),
            }
        }
        reaction.replies
    };

    for reply in &replies {
        if !send_server_message(ws_sender, reply).await {
            error!("Failed to send reply to client.");
            return;
        }
    }

    for record in submissions {
        let app_state = app_state.clone();
        let session_state_lock = session_state_lock.clone();
        let ws_sender = ws_sender.clone();
        tokio::spawn(async move {
            let outcome = app_state.submitter.submit_application(&record).await;
            info!("Application {} settled: {:?}", record.id, outcome);
            let replies = session_state_lock.lock().await.finish_submission(outcome);
            for reply in &replies {
                if !send_server_message(&ws_sender, reply).await {
                    warn!("Client left before the submission result was delivered.");
                    break;
                }
            }
        });
    }
}
