//! Task dispatch - classifies, routes, records

use crate::command::envelope::ResultEnvelope;
use crate::command::handlers::{handle, HandlerSettings};
use crate::command::record::{CommandRecord, TaskStatus};
use crate::core::types::TaskId;
use crate::intent::{classify, IntentLabel};
use crate::services::Services;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Counts reported by `status_summary`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub total_tasks: usize,
    pub successful_tasks: usize,
    pub failed_tasks: usize,
    pub registered_modules: usize,
    /// Submissions currently executing
    pub active_tasks: usize,
}

/// Descriptor of a registered extension module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub name: String,
    pub description: String,
}

/// Routes commands to category handlers and keeps an append-only history
///
/// All methods take `&self`; share it behind an `Arc` to submit from
/// worker threads.
pub struct TaskDispatcher {
    services: Services,
    settings: HandlerSettings,
    /// Append-only; a record's sequence number is its position plus one
    history: Mutex<Vec<CommandRecord>>,
    modules: Mutex<Vec<ModuleInfo>>,
}

impl TaskDispatcher {
    pub fn new(services: Services) -> Self {
        Self::with_settings(services, HandlerSettings::from(crate::core::config::config()))
    }

    pub fn with_settings(services: Services, settings: HandlerSettings) -> Self {
        Self {
            services,
            settings,
            history: Mutex::new(Vec::new()),
            modules: Mutex::new(Vec::new()),
        }
    }

    /// Classify and execute a command
    pub fn submit(&self, command: &str) -> ResultEnvelope {
        self.submit_with_intent(command, None)
    }

    /// Execute a command, using `intent` instead of classifying when given
    ///
    /// Never fails: handler errors come back as a failure envelope. The
    /// record is appended as pending before the handler runs, so history
    /// stays in submission order when several threads submit at once.
    pub fn submit_with_intent(&self, command: &str, intent: Option<IntentLabel>) -> ResultEnvelope {
        let intent = intent.unwrap_or_else(|| classify(command));
        let (slot, id) = {
            let mut history = self.history.lock();
            let slot = history.len();
            let id = TaskId(slot as u64 + 1);
            history.push(CommandRecord::new(id, command.to_string(), intent));
            (slot, id)
        };

        tracing::info!(task = %id, %intent, command, "task submitted");

        let envelope = ResultEnvelope::from(handle(intent, command, &self.services, &self.settings));
        if let Some(error) = envelope.error() {
            tracing::warn!(task = %id, %intent, error, "task failed");
        } else {
            tracing::debug!(task = %id, %intent, "task completed");
        }

        if let Some(record) = self.history.lock().get_mut(slot) {
            record.finish(envelope.clone());
        }

        envelope
    }

    /// The most recent `limit` records, oldest first
    ///
    /// Commands still executing on another thread appear as pending.
    pub fn history(&self, limit: usize) -> Vec<CommandRecord> {
        let history = self.history.lock();
        let skip = history.len().saturating_sub(limit);
        history[skip..].to_vec()
    }

    pub fn history_len(&self) -> usize {
        self.history.lock().len()
    }

    pub fn status_summary(&self) -> StatusSummary {
        let history = self.history.lock();
        let count = |status: TaskStatus| history.iter().filter(|r| r.status == status).count();

        StatusSummary {
            total_tasks: history.len(),
            successful_tasks: count(TaskStatus::Completed),
            failed_tasks: count(TaskStatus::Failed),
            registered_modules: self.modules.lock().len(),
            active_tasks: count(TaskStatus::Pending),
        }
    }

    /// Record an extension module; a repeated name replaces its description
    pub fn register_module(&self, name: &str, description: &str) {
        let mut modules = self.modules.lock();
        match modules.iter_mut().find(|m| m.name == name) {
            Some(existing) => existing.description = description.to_string(),
            None => modules.push(ModuleInfo {
                name: name.to_string(),
                description: description.to_string(),
            }),
        }
        tracing::debug!(module = name, "module registered");
    }

    /// Registered modules in registration order
    pub fn modules(&self) -> Vec<ModuleInfo> {
        self.modules.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{Result, ShellError};
    use crate::services::network_manager::simulated_weather;
    use crate::services::*;
    use std::path::Path;
    use std::sync::mpsc;
    use std::sync::Arc;

    struct NoFiles;
    impl FileAccess for NoFiles {
        fn list_directory(&self, _path: Option<&Path>) -> Result<DirectoryListing> {
            Err(ShellError::PathNotFound("/nowhere".into()))
        }
    }

    struct OfflineNetwork;
    impl NetworkAccess for OfflineNetwork {
        fn search(&self, _query: &str) -> Result<SearchResponse> {
            Err(ShellError::Network("offline".into()))
        }
        fn weather(&self, location: &str) -> Result<WeatherReport> {
            Ok(simulated_weather(location))
        }
        fn check_connectivity(&self) -> Result<ConnectivityReport> {
            Ok(ConnectivityReport::from_probes(Vec::new()))
        }
        fn network_info(&self) -> Result<NetworkInfo> {
            Err(ShellError::Network("offline".into()))
        }
    }

    struct NoSystem;
    impl SystemAccess for NoSystem {
        fn system_info(&self) -> Result<SystemSnapshot> {
            Err(ShellError::System("unavailable".into()))
        }
        fn running_processes(&self, _limit: usize) -> Result<Vec<ProcessInfo>> {
            Ok(Vec::new())
        }
        fn system_health(&self) -> Result<HealthReport> {
            Err(ShellError::System("unavailable".into()))
        }
    }

    fn dispatcher() -> TaskDispatcher {
        let services = Services::new(Arc::new(NoFiles), Arc::new(OfflineNetwork), Arc::new(NoSystem));
        TaskDispatcher::with_settings(services, HandlerSettings::default())
    }

    #[test]
    fn test_ids_are_sequential() {
        let d = dispatcher();
        d.submit("hello");
        d.submit("list files");
        d.submit("weather in Rome");

        let ids: Vec<u64> = d.history(10).iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_failure_is_recorded() {
        let d = dispatcher();
        let envelope = d.submit("list files");

        assert_eq!(envelope.error(), Some("Path does not exist"));
        let record = &d.history(1)[0];
        assert_eq!(record.status, TaskStatus::Failed);
        assert_eq!(record.intent, IntentLabel::FileOperation);
        assert_eq!(record.result.as_ref(), Some(&envelope));
    }

    #[test]
    fn test_supplied_intent_overrides_classification() {
        let d = dispatcher();
        let envelope = d.submit_with_intent("list files", Some(IntentLabel::General));

        assert!(envelope.is_success());
        assert_eq!(d.history(1)[0].intent, IntentLabel::General);
    }

    #[test]
    fn test_status_summary_counts() {
        let d = dispatcher();
        d.submit("hello");
        d.submit("system status");
        d.submit("weather");
        d.register_module("file_operation", "Directory listing");
        d.register_module("file_operation", "Listing and reads");

        let summary = d.status_summary();
        assert_eq!(summary.total_tasks, 3);
        assert_eq!(summary.successful_tasks, 2);
        assert_eq!(summary.failed_tasks, 1);
        assert_eq!(summary.registered_modules, 1);
        assert_eq!(summary.active_tasks, 0);
        assert_eq!(d.modules()[0].description, "Listing and reads");
    }

    #[test]
    fn test_history_limit_zero_is_empty() {
        let d = dispatcher();
        d.submit("hello");
        assert!(d.history(0).is_empty());
    }

    #[test]
    fn test_shared_across_threads() {
        let d = Arc::new(dispatcher());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let d = Arc::clone(&d);
                std::thread::spawn(move || {
                    for _ in 0..5 {
                        d.submit(&format!("hello {}", i));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let history = d.history(100);
        assert_eq!(history.len(), 20);
        let ids: Vec<u64> = history.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, (1..=20).collect::<Vec<u64>>());
    }

    /// Network accessor whose search blocks until the test releases it
    struct GatedNetwork {
        entered: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl NetworkAccess for GatedNetwork {
        fn search(&self, _query: &str) -> Result<SearchResponse> {
            let _ = self.entered.lock().send(());
            let _ = self.release.lock().recv();
            Err(ShellError::Network("slow".into()))
        }
        fn weather(&self, location: &str) -> Result<WeatherReport> {
            Ok(simulated_weather(location))
        }
        fn check_connectivity(&self) -> Result<ConnectivityReport> {
            Ok(ConnectivityReport::from_probes(Vec::new()))
        }
        fn network_info(&self) -> Result<NetworkInfo> {
            Err(ShellError::Network("offline".into()))
        }
    }

    #[test]
    fn test_slow_command_keeps_submission_order() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let network = GatedNetwork {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        };
        let services = Services::new(Arc::new(NoFiles), Arc::new(network), Arc::new(NoSystem));
        let d = Arc::new(TaskDispatcher::with_settings(services, HandlerSettings::default()));

        let slow = {
            let d = Arc::clone(&d);
            std::thread::spawn(move || d.submit("search rust"))
        };
        entered_rx.recv().unwrap();

        // Second command finishes while the first is still executing
        assert!(d.submit("hello").is_success());

        let during = d.history(10);
        let ids: Vec<u64> = during.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(during[0].status, TaskStatus::Pending);
        assert!(during[0].result.is_none());
        assert_eq!(during[1].status, TaskStatus::Completed);
        assert_eq!(d.status_summary().active_tasks, 1);

        release_tx.send(()).unwrap();
        assert!(slow.join().unwrap().is_failure());

        let after = d.history(10);
        let ids: Vec<u64> = after.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(after[0].command, "search rust");
        assert_eq!(after[0].status, TaskStatus::Failed);

        let summary = d.status_summary();
        assert_eq!(summary.active_tasks, 0);
        assert_eq!(summary.failed_tasks, 1);
        assert_eq!(summary.successful_tasks, 1);
    }
}
