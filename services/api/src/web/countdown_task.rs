//! services/api/src/web/countdown_task.rs
//!
//! This module contains the asynchronous "worker" function that drives the quiz
//! countdown for one connection.

use crate::web::{
    protocol::send_server_message,
    session::SessionState,
};
use axum::extract::ws::Message;
use futures::Sink;
use recruit_core::assessment::TickOutcome;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Ticks the running quiz once per second until it completes or the token is cancelled.
///
/// The tick that reaches zero completes the quiz inside `SessionState`; this task
/// only forwards the resulting messages and then ends.
pub async fn countdown_process<S>(
    session_state_lock: Arc<Mutex<SessionState>>,
    ws_sender: Arc<Mutex<S>>,
    cancellation_token: CancellationToken,
) where
    S: Sink<Message> + Unpin + Send,
{
    info!("Quiz countdown started.");
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    // The first tick of an interval completes immediately.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                info!("Quiz countdown cancelled.");
                return;
            }
            _ = interval.tick() => {}
        }

        let (outcome, replies) = {
            let mut session = session_state_lock.lock().await;
            // A cancel that raced the tick wins.
            if cancellation_token.is_cancelled() {
                info!("Quiz countdown cancelled.");
                return;
            }
            session.tick_quiz()
        };

        for reply in &replies {
            if !send_server_message(&ws_sender, reply).await {
                error!("Failed to send countdown update to client. Ending countdown task.");
                return;
            }
        }

        match outcome {
            TickOutcome::Running { .. } => {}
            TickOutcome::Idle => {
                info!("Quiz no longer running; countdown finished.");
                return;
            }
            TickOutcome::TimedOut(result) => {
                info!(
                    "Quiz timed out with score {}% ({} of {}).",
                    result.score_percent, result.correct_count, result.total_questions
                );
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::questions::default_questions;
    use crate::web::protocol::ClientMessage;
    use futures::channel::mpsc;
    use futures::StreamExt;
    use recruit_core::assessment::{AssessmentConfig, AssessmentPhase};
    use recruit_core::wizard::GatingPolicy;

    fn decode(msg: Message) -> serde_json::Value {
        match msg {
            Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
            other => panic!("unexpected frame {other:?}"),
        }
    }

    fn running_session(time_limit_secs: u32) -> Arc<Mutex<SessionState>> {
        let mut session = SessionState::new(
            default_questions(),
            AssessmentConfig {
                time_limit_secs,
                pass_percent: 70,
            },
            GatingPolicy::Free,
        )
        .unwrap();
        session.apply(ClientMessage::Advance);
        session.apply(ClientMessage::StartQuiz);
        Arc::new(Mutex::new(session))
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_and_times_out() {
        let session = running_session(3);
        let (tx, mut rx) = mpsc::unbounded::<Message>();
        let token = CancellationToken::new();

        let task = tokio::spawn(countdown_process(
            session.clone(),
            Arc::new(Mutex::new(tx)),
            token.clone(),
        ));
        task.await.unwrap();

        let first = decode(rx.next().await.unwrap());
        assert_eq!(first["type"], "quiz_tick");
        assert_eq!(first["remaining_seconds"], 2);
        let second = decode(rx.next().await.unwrap());
        assert_eq!(second["remaining_seconds"], 1);
        let done = decode(rx.next().await.unwrap());
        assert_eq!(done["type"], "quiz_completed");
        assert_eq!(done["timed_out"], true);
        assert_eq!(done["result"]["elapsed_seconds"], 3);
        let state = decode(rx.next().await.unwrap());
        assert_eq!(state["type"], "wizard_state");

        let session = session.lock().await;
        assert_eq!(session.assessment.phase(), AssessmentPhase::Completed);
        assert!(session.wizard.record().quiz_result.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_the_clock() {
        let session = running_session(1800);
        let (tx, mut rx) = mpsc::unbounded::<Message>();
        let token = CancellationToken::new();

        let task = tokio::spawn(countdown_process(
            session.clone(),
            Arc::new(Mutex::new(tx)),
            token.clone(),
        ));

        let first = decode(rx.next().await.unwrap());
        assert_eq!(first["remaining_seconds"], 1799);

        token.cancel();
        task.await.unwrap();

        let remaining = session.lock().await.assessment.remaining_seconds();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(session.lock().await.assessment.remaining_seconds(), remaining);
        assert_eq!(
            session.lock().await.assessment.phase(),
            AssessmentPhase::InProgress
        );
    }

    #[tokio::test(start_paused = true)]
    async fn manual_completion_ends_the_task() {
        let session = running_session(1800);
        let (tx, _rx) = mpsc::unbounded::<Message>();
        let token = CancellationToken::new();

        session.lock().await.apply(ClientMessage::CompleteQuiz);
        countdown_process(session.clone(), Arc::new(Mutex::new(tx)), token).await;

        assert_eq!(session.lock().await.assessment.remaining_seconds(), 1800);
    }
}
