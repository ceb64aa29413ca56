//! Command records kept in the dispatcher history

use crate::command::envelope::ResultEnvelope;
use crate::core::types::{now, TaskId, Timestamp};
use crate::intent::IntentLabel;
use serde::{Deserialize, Serialize};

/// Priority levels with explicit ordering values
///
/// Submissions always use `Medium`; nothing schedules on it yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum TaskPriority {
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

impl Default for TaskPriority {
    fn default() -> Self {
        Self::Medium
    }
}

/// Lifecycle of a record: Pending -> Completed | Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Pending)
    }
}

/// One submitted command and its outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRecord {
    pub id: TaskId,
    pub command: String,
    pub intent: IntentLabel,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub submitted_at: Timestamp,
    pub result: Option<ResultEnvelope>,
}

impl CommandRecord {
    pub fn new(id: TaskId, command: String, intent: IntentLabel) -> Self {
        Self {
            id,
            command,
            intent,
            status: TaskStatus::Pending,
            priority: TaskPriority::default(),
            submitted_at: now(),
            result: None,
        }
    }

    /// Attach the outcome, moving the record to its terminal status
    pub fn finish(&mut self, result: ResultEnvelope) {
        self.status = if result.is_success() {
            TaskStatus::Completed
        } else {
            TaskStatus::Failed
        };
        self.result = Some(result);
    }
}
