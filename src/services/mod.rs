//! Collaborators the command handlers delegate to
//!
//! Each accessor is a thin wrapper over an OS or HTTP facility. Handlers
//! only see the traits, so tests substitute their own implementations.

pub mod file_manager;
pub mod network_manager;
pub mod system_manager;

use crate::core::error::Result;
use std::path::Path;
use std::sync::Arc;

pub use file_manager::{bytes_to_human, DirectoryItem, DirectoryListing, LocalFileManager};
pub use network_manager::{
    ConnectivityReport, HttpNetworkManager, NetworkInfo, SearchResponse, WeatherReport,
};
pub use system_manager::{
    HealthReport, HealthStatus, ProcessInfo, SysinfoSystemManager, SystemMonitor, SystemSnapshot,
};

/// Directory access
pub trait FileAccess: Send + Sync {
    /// List `path`, or the accessor's working directory when `None`
    fn list_directory(&self, path: Option<&Path>) -> Result<DirectoryListing>;
}

/// Web search, weather and connectivity
pub trait NetworkAccess: Send + Sync {
    fn search(&self, query: &str) -> Result<SearchResponse>;
    fn weather(&self, location: &str) -> Result<WeatherReport>;
    fn check_connectivity(&self) -> Result<ConnectivityReport>;
    fn network_info(&self) -> Result<NetworkInfo>;
}

/// CPU, memory, disk and process statistics
pub trait SystemAccess: Send + Sync {
    fn system_info(&self) -> Result<SystemSnapshot>;
    fn running_processes(&self, limit: usize) -> Result<Vec<ProcessInfo>>;
    fn system_health(&self) -> Result<HealthReport>;
}

/// The accessors a dispatcher routes to
#[derive(Clone)]
pub struct Services {
    pub files: Arc<dyn FileAccess>,
    pub network: Arc<dyn NetworkAccess>,
    pub system: Arc<dyn SystemAccess>,
}

impl Services {
    pub fn new(
        files: Arc<dyn FileAccess>,
        network: Arc<dyn NetworkAccess>,
        system: Arc<dyn SystemAccess>,
    ) -> Self {
        Self {
            files,
            network,
            system,
        }
    }

    /// Local filesystem, reqwest and sysinfo accessors
    pub fn local() -> Result<Self> {
        Ok(Self::new(
            Arc::new(LocalFileManager::new()?),
            Arc::new(HttpNetworkManager::new()?),
            Arc::new(SysinfoSystemManager::new()),
        ))
    }
}
