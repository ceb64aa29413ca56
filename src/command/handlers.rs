//! Category handlers
//!
//! Each handler picks one collaborator call by keyword and converts its
//! typed record into a payload. Collaborator errors are returned untouched
//! so the dispatcher reports them verbatim.

use crate::command::envelope::{message, to_payload, Payload};
use crate::core::config::ShellConfig;
use crate::core::error::Result;
use crate::core::types::{now, unix_seconds};
use crate::intent::classifier::contains_any;
use crate::intent::IntentLabel;
use crate::services::Services;
use serde_json::Value;

/// Handler knobs taken from the shell config
#[derive(Debug, Clone)]
pub struct HandlerSettings {
    pub process_limit: usize,
    pub default_weather_location: String,
}

impl From<&ShellConfig> for HandlerSettings {
    fn from(cfg: &ShellConfig) -> Self {
        Self {
            process_limit: cfg.process_limit,
            default_weather_location: cfg.default_weather_location.clone(),
        }
    }
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self::from(&ShellConfig::default())
    }
}

/// Route `command` to the handler for `intent`
pub fn handle(
    intent: IntentLabel,
    command: &str,
    services: &Services,
    settings: &HandlerSettings,
) -> Result<Payload> {
    match intent {
        IntentLabel::FileOperation => handle_file_operation(command, services),
        IntentLabel::NetworkOperation => handle_network_operation(command, services, settings),
        IntentLabel::SystemOperation => handle_system_operation(command, services, settings),
        IntentLabel::General => Ok(handle_general(command)),
    }
}

fn handle_file_operation(command: &str, services: &Services) -> Result<Payload> {
    let lowered = command.to_lowercase();

    if contains_any(&lowered, &["list", "ls"]) {
        let listing = services.files.list_directory(None)?;
        to_payload("listing", &listing)
    } else if lowered.contains("read") {
        Ok(message("File read operation"))
    } else {
        Ok(message("File operation completed"))
    }
}

fn handle_network_operation(
    command: &str,
    services: &Services,
    settings: &HandlerSettings,
) -> Result<Payload> {
    let lowered = command.to_lowercase();

    if lowered.contains("search") {
        let query = extract_search_query(command);
        to_payload("search", &services.network.search(&query)?)
    } else if lowered.contains("weather") {
        let location = extract_location(command)
            .unwrap_or_else(|| settings.default_weather_location.clone());
        to_payload("weather", &services.network.weather(&location)?)
    } else if contains_any(&lowered, &["internet", "connectivity"]) {
        to_payload("connectivity", &services.network.check_connectivity()?)
    } else {
        to_payload("network", &services.network.network_info()?)
    }
}

fn handle_system_operation(
    command: &str,
    services: &Services,
    settings: &HandlerSettings,
) -> Result<Payload> {
    let lowered = command.to_lowercase();

    if lowered.contains("status") {
        to_payload("system", &services.system.system_info()?)
    } else if lowered.contains("process") {
        let processes = services.system.running_processes(settings.process_limit)?;
        to_payload("processes", &processes)
    } else if lowered.contains("health") {
        to_payload("health", &services.system.system_health()?)
    } else {
        to_payload("system", &services.system.system_info()?)
    }
}

fn handle_general(command: &str) -> Payload {
    let mut payload = message(format!("Command executed: {}", command));
    payload.insert(
        "timestamp".into(),
        Value::from(unix_seconds(&now())),
    );
    payload
}

/// The command with every "search" word removed
pub fn extract_search_query(command: &str) -> String {
    command
        .split_whitespace()
        .filter(|word| !word.eq_ignore_ascii_case("search"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text after the first standalone "in", if any
pub fn extract_location(command: &str) -> Option<String> {
    let words: Vec<&str> = command.split_whitespace().collect();
    let at = words.iter().position(|w| w.eq_ignore_ascii_case("in"))?;
    let location = words[at + 1..].join(" ");
    if location.is_empty() {
        None
    } else {
        Some(location)
    }
}
