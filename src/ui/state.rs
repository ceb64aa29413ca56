//! Terminal session state: activity log and the last entered line

use chrono::{DateTime, Local};
use std::collections::VecDeque;

/// Maximum activity log entries to keep
const MAX_LOG_ENTRIES: usize = 50;

/// Interactive session state
#[derive(Debug, Default)]
pub struct ShellState {
    /// Activity log entries
    pub activity_log: VecDeque<LogEntry>,
    /// Most recent line entered, replayed by `!!`
    last_input: Option<String>,
}

/// An entry in the activity log
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub message: String,
    pub category: LogCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    Command,
    Success,
    Failure,
    System,
}

impl LogCategory {
    /// Short tag shown in the activity log
    pub fn tag(&self) -> &'static str {
        match self {
            LogCategory::Command => "cmd",
            LogCategory::Success => "ok",
            LogCategory::Failure => "fail",
            LogCategory::System => "sys",
        }
    }
}

impl ShellState {
    pub fn new() -> Self {
        Self {
            activity_log: VecDeque::with_capacity(MAX_LOG_ENTRIES),
            last_input: None,
        }
    }

    /// Add an entry to the activity log
    pub fn log(&mut self, message: String, category: LogCategory) {
        if self.activity_log.len() >= MAX_LOG_ENTRIES {
            self.activity_log.pop_front();
        }
        self.activity_log.push_back(LogEntry {
            at: Local::now(),
            message,
            category,
        });
    }

    /// Remember an entered line
    pub fn record_input(&mut self, line: &str) {
        self.last_input = Some(line.to_string());
    }

    pub fn previous_input(&self) -> Option<&str> {
        self.last_input.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_bounded() {
        let mut state = ShellState::new();
        for i in 0..(MAX_LOG_ENTRIES + 5) {
            state.log(format!("entry {}", i), LogCategory::System);
        }
        assert_eq!(state.activity_log.len(), MAX_LOG_ENTRIES);
        assert_eq!(state.activity_log.front().unwrap().message, "entry 5");
    }

    #[test]
    fn test_previous_input_is_latest_line() {
        let mut state = ShellState::new();
        assert_eq!(state.previous_input(), None);

        state.record_input("ls");
        state.record_input("weather in Paris");
        assert_eq!(state.previous_input(), Some("weather in Paris"));
        assert_eq!(state.previous_input(), Some("weather in Paris"));
    }
}
