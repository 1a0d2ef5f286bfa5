//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use recruit_core::ports::{PersistenceService, QuestionBank};
use recruit_core::submission::Submitter;
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub persistence: Arc<dyn PersistenceService>,
    pub submitter: Submitter,
    pub question_bank: Arc<dyn QuestionBank>,
    pub config: Arc<Config>,
}
