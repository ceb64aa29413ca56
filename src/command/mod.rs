//! Command execution pipeline
//!
//! Converts raw command text into a recorded outcome:
//! text -> classify -> IntentLabel -> handler -> ResultEnvelope -> CommandRecord

pub mod dispatcher;
pub mod envelope;
pub mod handlers;
pub mod record;

pub use dispatcher::{ModuleInfo, StatusSummary, TaskDispatcher};
pub use envelope::{Payload, ResultEnvelope};
pub use handlers::HandlerSettings;
pub use record::{CommandRecord, TaskPriority, TaskStatus};
