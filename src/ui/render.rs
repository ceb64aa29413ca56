//! Text rendering of interpretations, envelopes and history

use crate::command::{CommandRecord, ResultEnvelope, StatusSummary};
use crate::intent::InterpretedCommand;
use crate::ui::state::LogEntry;
use serde_json::Value;

/// Characters of a search snippet shown before eliding
const SNIPPET_CHARS: usize = 100;

/// Array elements listed before summarizing the rest
const MAX_LISTED_ELEMENTS: usize = 25;

const RULE_WIDTH: usize = 60;

pub fn render_interpretation(interpreted: &InterpretedCommand) -> String {
    format!(
        "Command: {}\nIntent: {}\nExecution Plan:\n{}\n\n{}\n",
        interpreted.original_text,
        interpreted.detected_intent,
        interpreted.execution_plan,
        "=".repeat(RULE_WIDTH)
    )
}

pub fn render_envelope(envelope: &ResultEnvelope) -> String {
    match envelope {
        ResultEnvelope::Failure { error } => format!("RESULT: FAILED\nError: {}\n", error),
        ResultEnvelope::Success { payload } => {
            let mut out = String::from("RESULT: SUCCESS\n\n");
            for (key, value) in payload {
                match (key.as_str(), value) {
                    ("message", Value::String(text)) => {
                        out.push_str(text);
                        out.push('\n');
                    }
                    ("results", Value::Array(results)) => render_search_results(&mut out, results),
                    _ => render_field(&mut out, key, value),
                }
            }
            out
        }
    }
}

fn render_search_results(out: &mut String, results: &[Value]) {
    for item in results {
        let title = item.get("title").and_then(Value::as_str).unwrap_or("Item");
        out.push_str(&format!("- {}\n", title));
        if let Some(snippet) = item.get("snippet").and_then(Value::as_str) {
            let short: String = snippet.chars().take(SNIPPET_CHARS).collect();
            out.push_str(&format!("  {}...\n", short));
        }
        out.push('\n');
    }
}

fn render_field(out: &mut String, key: &str, value: &Value) {
    match value {
        Value::Object(map) => {
            out.push_str(&format!("{}:\n", key));
            for (k, v) in map {
                out.push_str(&format!("  {}: {}\n", k, scalar(v)));
            }
        }
        Value::Array(items) => {
            out.push_str(&format!("{}: ({})\n", key, items.len()));
            for item in items.iter().take(MAX_LISTED_ELEMENTS) {
                out.push_str(&format!("  - {}\n", element_label(item)));
            }
            if items.len() > MAX_LISTED_ELEMENTS {
                out.push_str(&format!("  ... {} more\n", items.len() - MAX_LISTED_ELEMENTS));
            }
        }
        other => out.push_str(&format!("{}: {}\n", key, scalar(other))),
    }
}

/// Short label for an array element: its name or title, else compact JSON
fn element_label(item: &Value) -> String {
    ["name", "title", "url"]
        .iter()
        .find_map(|k| item.get(*k).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| scalar(item))
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".into(),
        other => other.to_string(),
    }
}

pub fn render_history(records: &[CommandRecord]) -> String {
    if records.is_empty() {
        return "No commands yet\n".into();
    }
    let mut out = String::new();
    for record in records {
        out.push_str(&format!(
            "{:>4}  {}  {:<17} {:<9} {}\n",
            record.id,
            record.submitted_at.format("%H:%M:%S"),
            record.intent.as_str(),
            format!("{:?}", record.status).to_lowercase(),
            record.command
        ));
    }
    out
}

pub fn render_activity<'a>(entries: impl IntoIterator<Item = &'a LogEntry>) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!(
            "[{}] {:<4} {}\n",
            entry.at.format("%H:%M:%S"),
            entry.category.tag(),
            entry.message
        ));
    }
    out
}

pub fn render_summary(summary: &StatusSummary) -> String {
    format!(
        "Tasks: {} total, {} completed, {} failed, {} active\nModules: {}\n",
        summary.total_tasks,
        summary.successful_tasks,
        summary.failed_tasks,
        summary.active_tasks,
        summary.registered_modules
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::envelope::message;
    use crate::ui::LogCategory;
    use serde_json::json;

    #[test]
    fn test_failure_rendering() {
        let text = render_envelope(&ResultEnvelope::failure("offline"));
        assert_eq!(text, "RESULT: FAILED\nError: offline\n");
    }

    #[test]
    fn test_message_and_nested_map() {
        let mut payload = message("done");
        payload.insert("weather".into(), json!({"location": "Paris", "humidity": 65}));

        let text = render_envelope(&ResultEnvelope::success(payload));
        assert!(text.starts_with("RESULT: SUCCESS"));
        assert!(text.contains("done\n"));
        assert!(text.contains("weather:\n"));
        assert!(text.contains("  location: Paris\n"));
        assert!(text.contains("  humidity: 65\n"));
    }

    #[test]
    fn test_search_snippets_are_shortened() {
        let mut payload = crate::command::Payload::new();
        payload.insert(
            "results".into(),
            json!([{"title": "Rust", "snippet": "x".repeat(150)}]),
        );

        let text = render_envelope(&ResultEnvelope::success(payload));
        assert!(text.contains("- Rust\n"));
        assert!(text.contains(&format!("  {}...\n", "x".repeat(100))));
        assert!(!text.contains(&"x".repeat(101)));
    }

    #[test]
    fn test_arrays_list_names() {
        let mut payload = crate::command::Payload::new();
        payload.insert("items".into(), json!([{"name": "src"}, {"name": "Cargo.toml"}]));

        let text = render_envelope(&ResultEnvelope::success(payload));
        assert!(text.contains("items: (2)\n  - src\n  - Cargo.toml\n"));
    }

    #[test]
    fn test_activity_shows_category_tags() {
        let mut state = crate::ui::ShellState::new();
        state.log("Using default configuration".into(), LogCategory::System);
        state.log("Command: hello".into(), LogCategory::Command);

        let text = render_activity(&state.activity_log);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("] sys  Using default configuration"));
        assert!(lines[1].ends_with("] cmd  Command: hello"));
    }
}
