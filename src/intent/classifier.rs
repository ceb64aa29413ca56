//! Keyword-based intent classification
//!
//! Commands are sorted into one of four categories by ordered substring
//! tests. The first keyword set with any member present in the lowercased
//! input wins; there is no scoring. Overlapping phrasing such as
//! "search for my files" resolves by check order alone (file before
//! network before system).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category a command is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentLabel {
    /// Directory listing and file manipulation
    FileOperation,
    /// Search, weather and connectivity
    NetworkOperation,
    /// CPU, memory, process and health reports
    SystemOperation,
    /// Anything else; echoed back
    General,
}

impl IntentLabel {
    /// All labels in classification priority order
    pub const ALL: [IntentLabel; 4] = [
        IntentLabel::FileOperation,
        IntentLabel::NetworkOperation,
        IntentLabel::SystemOperation,
        IntentLabel::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentLabel::FileOperation => "file_operation",
            IntentLabel::NetworkOperation => "network_operation",
            IntentLabel::SystemOperation => "system_operation",
            IntentLabel::General => "general",
        }
    }

    /// Keywords that select this label (empty for the fallback)
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            IntentLabel::FileOperation => FILE_KEYWORDS,
            IntentLabel::NetworkOperation => NETWORK_KEYWORDS,
            IntentLabel::SystemOperation => SYSTEM_KEYWORDS,
            IntentLabel::General => &[],
        }
    }
}

impl fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IntentLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| format!("Unknown intent label: {}", s))
    }
}

const FILE_KEYWORDS: &[&str] = &[
    "file",
    "folder",
    "directory",
    "list",
    "ls",
    "read",
    "create",
    "delete",
];

const NETWORK_KEYWORDS: &[&str] = &[
    "search",
    "find",
    "weather",
    "internet",
    "connectivity",
    "network",
];

const SYSTEM_KEYWORDS: &[&str] = &["system", "status", "process", "cpu", "memory", "health"];

/// Classify free text into an intent label
///
/// Total and pure: the same text always yields the same label, and text
/// matching no keyword is `General`.
pub fn classify(text: &str) -> IntentLabel {
    let lowered = text.to_lowercase();

    let label = IntentLabel::ALL
        .into_iter()
        .find(|label| contains_any(&lowered, label.keywords()))
        .unwrap_or(IntentLabel::General);

    tracing::debug!(intent = %label, "classified command");
    label
}

/// True when any keyword occurs as a substring of `text`
pub(crate) fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}
