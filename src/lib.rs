// Crate root library declaration and module exports.
pub mod cli;
pub mod config;
pub mod context;
pub mod model;
pub mod storage;
pub mod store;
pub mod system;
pub mod transcript;

pub use model::{AlarmCommand, RepeatDays, next_trigger, parse_command};
