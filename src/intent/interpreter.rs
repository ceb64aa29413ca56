//! Command interpretation for display
//!
//! Wraps the classifier with a fixed execution plan per label and keeps a
//! bounded log of what was interpreted. The plan is presentation only; the
//! dispatcher does not consult it.

use crate::core::types::{now, Timestamp};
use crate::intent::classifier::{classify, IntentLabel};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Confidence reported for every keyword classification
pub const KEYWORD_CONFIDENCE: f32 = 0.85;

/// Maximum interpretations kept in memory
const MAX_INTERPRETER_HISTORY: usize = 500;

/// Result of interpreting one command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpretedCommand {
    pub original_text: String,
    pub detected_intent: IntentLabel,
    pub execution_plan: String,
    pub confidence: f32,
}

/// One entry in the interpreter's log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpretedEntry {
    pub text: String,
    pub intent: IntentLabel,
    pub timestamp: Timestamp,
}

/// Classifies commands and remembers them
#[derive(Debug, Default)]
pub struct CommandInterpreter {
    history: VecDeque<InterpretedEntry>,
}

impl CommandInterpreter {
    pub fn new() -> Self {
        Self {
            history: VecDeque::new(),
        }
    }

    /// Classify `text`, attach its plan, and log it
    pub fn interpret(&mut self, text: &str) -> InterpretedCommand {
        let intent = classify(text);

        if self.history.len() >= MAX_INTERPRETER_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(InterpretedEntry {
            text: text.to_string(),
            intent,
            timestamp: now(),
        });

        InterpretedCommand {
            original_text: text.to_string(),
            detected_intent: intent,
            execution_plan: execution_plan(intent).to_string(),
            confidence: KEYWORD_CONFIDENCE,
        }
    }

    /// The most recent `limit` interpretations, oldest first
    pub fn history(&self, limit: usize) -> Vec<InterpretedEntry> {
        let skip = self.history.len().saturating_sub(limit);
        self.history.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

/// Fixed step list shown for a label
pub fn execution_plan(intent: IntentLabel) -> &'static str {
    match intent {
        IntentLabel::FileOperation => {
            "1. Analyze file operation request\n2. Check permissions\n3. Execute file operation\n4. Return results"
        }
        IntentLabel::NetworkOperation => {
            "1. Analyze network request\n2. Check connectivity\n3. Execute network operation\n4. Process response"
        }
        IntentLabel::SystemOperation => {
            "1. Analyze system request\n2. Gather system data\n3. Generate report\n4. Display information"
        }
        IntentLabel::General => {
            "1. Process general command\n2. Execute appropriate action\n3. Return response"
        }
    }
}
