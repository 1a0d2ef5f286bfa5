pub mod countdown_task;
pub mod protocol;
pub mod rest;
pub mod session;
pub mod state;
pub mod ws_handler;

// Re-export the main handlers to make them easily accessible
// to the binary that builds the web server router.
pub use rest::{contact_handler, list_slots_handler, upload_resume_handler};
pub use ws_handler::ws_handler;
