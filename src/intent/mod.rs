//! Intent detection
//!
//! raw text -> classify -> IntentLabel, with an interpreter that adds
//! an execution plan for display.

pub mod classifier;
pub mod interpreter;

pub use classifier::{classify, IntentLabel};
pub use interpreter::{execution_plan, CommandInterpreter, InterpretedCommand, InterpretedEntry};
