pub mod db;
pub mod notify;
pub mod questions;

pub use db::DbAdapter;
pub use notify::HttpNotifier;
pub use questions::JsonQuestionBank;
