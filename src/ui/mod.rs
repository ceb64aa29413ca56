//! Terminal front-end pieces for the interactive shell

pub mod builtins;
pub mod render;
pub mod state;

pub use builtins::Builtin;
pub use state::{LogCategory, LogEntry, ShellState};
