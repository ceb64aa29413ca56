//! System information accessor and background monitor

use crate::core::config::{config, ShellConfig};
use crate::core::error::Result;
use crate::core::types::{bytes_to_gb, bytes_to_mb, now, round2, Timestamp};
use crate::services::SystemAccess;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use sysinfo::{Disks, Networks, System, Users};

// === RECORDS ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuInfo {
    pub usage_percent: f32,
    pub core_count: usize,
    pub frequency_mhz: u64,
    /// One, five and fifteen minute load averages
    pub load_average: [f64; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub total_gb: f64,
    pub available_gb: f64,
    pub used_gb: f64,
    pub used_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskInfo {
    pub total_gb: f64,
    pub used_gb: f64,
    pub free_gb: f64,
    pub used_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkTotals {
    pub bytes_sent_mb: f64,
    pub bytes_recv_mb: f64,
    pub interface_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostInfo {
    pub hostname: Option<String>,
    pub os: Option<String>,
    pub boot_time: Option<DateTime<Utc>>,
    pub users_count: usize,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub cpu: CpuInfo,
    pub memory: MemoryInfo,
    pub disk: DiskInfo,
    pub network: NetworkTotals,
    pub host: HostInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f32,
    pub memory_percent: f64,
    pub status: String,
}

/// Health levels, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub warnings: Vec<String>,
    pub timestamp: Timestamp,
}

/// Usage thresholds applied by `assess_health`
#[derive(Debug, Clone, Copy)]
pub struct HealthThresholds {
    pub cpu_warning_percent: f32,
    pub memory_critical_percent: f32,
    pub disk_warning_percent: f32,
}

impl From<&ShellConfig> for HealthThresholds {
    fn from(cfg: &ShellConfig) -> Self {
        Self {
            cpu_warning_percent: cfg.cpu_warning_percent,
            memory_critical_percent: cfg.memory_critical_percent,
            disk_warning_percent: cfg.disk_warning_percent,
        }
    }
}

/// Grade a snapshot; the reported status is the most severe one raised
pub fn assess_health(snapshot: &SystemSnapshot, thresholds: &HealthThresholds) -> HealthReport {
    let mut status = HealthStatus::Healthy;
    let mut warnings = Vec::new();

    if snapshot.cpu.usage_percent > thresholds.cpu_warning_percent {
        status = status.max(HealthStatus::Warning);
        warnings.push("High CPU usage".to_string());
    }
    if snapshot.memory.used_percent > f64::from(thresholds.memory_critical_percent) {
        status = status.max(HealthStatus::Critical);
        warnings.push("High memory usage".to_string());
    }
    if snapshot.disk.used_percent > f64::from(thresholds.disk_warning_percent) {
        status = status.max(HealthStatus::Warning);
        warnings.push("Low disk space".to_string());
    }

    HealthReport {
        status,
        warnings,
        timestamp: now(),
    }
}

// === ACCESSOR ===

/// System accessor backed by sysinfo
///
/// Holds one `System` so CPU usage deltas accumulate across calls.
pub struct SysinfoSystemManager {
    system: Mutex<System>,
    thresholds: HealthThresholds,
}

impl SysinfoSystemManager {
    pub fn new() -> Self {
        Self::with_thresholds(HealthThresholds::from(config()))
    }

    pub fn with_thresholds(thresholds: HealthThresholds) -> Self {
        Self {
            system: Mutex::new(System::new_all()),
            thresholds,
        }
    }
}

impl Default for SysinfoSystemManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemAccess for SysinfoSystemManager {
    fn system_info(&self) -> Result<SystemSnapshot> {
        let mut sys = self.system.lock();

        // CPU usage is a delta between two refreshes
        sys.refresh_cpu();
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        sys.refresh_cpu();
        sys.refresh_memory();

        let load = System::load_average();
        let cpu = CpuInfo {
            usage_percent: sys.global_cpu_info().cpu_usage(),
            core_count: sys.cpus().len(),
            frequency_mhz: sys.cpus().first().map(|c| c.frequency()).unwrap_or(0),
            load_average: [load.one, load.five, load.fifteen],
        };

        let total_memory = sys.total_memory();
        let memory = MemoryInfo {
            total_gb: bytes_to_gb(total_memory),
            available_gb: bytes_to_gb(sys.available_memory()),
            used_gb: bytes_to_gb(sys.used_memory()),
            used_percent: percent(sys.used_memory(), total_memory),
        };
        drop(sys);

        let disks = Disks::new_with_refreshed_list();
        let (disk_total, disk_free) = disks
            .list()
            .iter()
            .fold((0u64, 0u64), |(total, free), d| {
                (total + d.total_space(), free + d.available_space())
            });
        let disk_used = disk_total.saturating_sub(disk_free);
        let disk = DiskInfo {
            total_gb: bytes_to_gb(disk_total),
            used_gb: bytes_to_gb(disk_used),
            free_gb: bytes_to_gb(disk_free),
            used_percent: percent(disk_used, disk_total),
        };

        let networks = Networks::new_with_refreshed_list();
        let (sent, received, interface_count) = (&networks).into_iter().fold(
            (0u64, 0u64, 0usize),
            |(sent, received, count), (_, data)| {
                (
                    sent + data.total_transmitted(),
                    received + data.total_received(),
                    count + 1,
                )
            },
        );
        let network = NetworkTotals {
            bytes_sent_mb: bytes_to_mb(sent),
            bytes_recv_mb: bytes_to_mb(received),
            interface_count,
        };

        let users = Users::new_with_refreshed_list();
        let host = HostInfo {
            hostname: System::host_name(),
            os: System::long_os_version(),
            boot_time: DateTime::from_timestamp(System::boot_time() as i64, 0),
            users_count: users.list().len(),
            timestamp: now(),
        };

        Ok(SystemSnapshot {
            cpu,
            memory,
            disk,
            network,
            host,
        })
    }

    fn running_processes(&self, limit: usize) -> Result<Vec<ProcessInfo>> {
        let mut sys = self.system.lock();
        sys.refresh_processes();
        sys.refresh_memory();
        let total_memory = sys.total_memory();

        let mut processes: Vec<ProcessInfo> = sys
            .processes()
            .iter()
            .map(|(pid, process)| ProcessInfo {
                pid: pid.as_u32(),
                name: process.name().to_string(),
                cpu_percent: process.cpu_usage(),
                memory_percent: percent(process.memory(), total_memory),
                status: process.status().to_string(),
            })
            .collect();

        processes.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent));
        processes.truncate(limit);
        Ok(processes)
    }

    fn system_health(&self) -> Result<HealthReport> {
        let snapshot = self.system_info()?;
        Ok(assess_health(&snapshot, &self.thresholds))
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round2(part as f64 / whole as f64 * 100.0)
    }
}

// === BACKGROUND MONITOR ===

/// Data handed to the monitor callback on each poll
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSample {
    pub system: SystemSnapshot,
    pub processes: Vec<ProcessInfo>,
    pub timestamp: Timestamp,
}

/// Fixed-interval polling loop on its own thread
///
/// Poll errors are logged and the loop keeps going. Dropping the monitor
/// stops it.
pub struct SystemMonitor {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SystemMonitor {
    pub fn start<S, F>(access: Arc<S>, interval: Duration, process_limit: usize, mut callback: F) -> Self
    where
        S: SystemAccess + ?Sized + 'static,
        F: FnMut(MonitorSample) + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let handle = std::thread::spawn(move || {
            tracing::info!(interval_ms = interval.as_millis() as u64, "system monitor started");
            while flag.load(Ordering::Relaxed) {
                let sample = access.system_info().and_then(|system| {
                    Ok(MonitorSample {
                        system,
                        processes: access.running_processes(process_limit)?,
                        timestamp: now(),
                    })
                });

                match sample {
                    Ok(sample) => callback(sample),
                    Err(e) => tracing::warn!(error = %e, "monitoring error"),
                }

                sleep_while_running(&flag, interval);
            }
            tracing::info!("system monitor stopped");
        });

        Self {
            running,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Signal the loop to end and wait for it
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("system monitor thread panicked");
            }
        }
    }
}

impl Drop for SystemMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Sleep in short slices so `stop` does not wait out a full interval
fn sleep_while_running(flag: &AtomicBool, interval: Duration) {
    const SLICE: Duration = Duration::from_millis(50);
    let mut remaining = interval;
    while !remaining.is_zero() && flag.load(Ordering::Relaxed) {
        let step = remaining.min(SLICE);
        std::thread::sleep(step);
        remaining -= step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(cpu: f32, memory: f64, disk: f64) -> SystemSnapshot {
        SystemSnapshot {
            cpu: CpuInfo {
                usage_percent: cpu,
                core_count: 4,
                frequency_mhz: 2400,
                load_average: [0.0; 3],
            },
            memory: MemoryInfo {
                total_gb: 16.0,
                available_gb: 8.0,
                used_gb: 8.0,
                used_percent: memory,
            },
            disk: DiskInfo {
                total_gb: 100.0,
                used_gb: 50.0,
                free_gb: 50.0,
                used_percent: disk,
            },
            network: NetworkTotals {
                bytes_sent_mb: 0.0,
                bytes_recv_mb: 0.0,
                interface_count: 1,
            },
            host: HostInfo {
                hostname: None,
                os: None,
                boot_time: None,
                users_count: 1,
                timestamp: now(),
            },
        }
    }

    fn thresholds() -> HealthThresholds {
        HealthThresholds::from(&ShellConfig::default())
    }

    #[test]
    fn test_healthy_when_below_thresholds() {
        let report = assess_health(&snapshot(10.0, 40.0, 50.0), &thresholds());
        assert_eq!(report.status, HealthStatus::Healthy);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_cpu_raises_warning() {
        let report = assess_health(&snapshot(95.0, 40.0, 50.0), &thresholds());
        assert_eq!(report.status, HealthStatus::Warning);
        assert_eq!(report.warnings, vec!["High CPU usage"]);
    }

    #[test]
    fn test_disk_warning_does_not_mask_memory_critical() {
        let report = assess_health(&snapshot(10.0, 95.0, 95.0), &thresholds());
        assert_eq!(report.status, HealthStatus::Critical);
        assert_eq!(report.warnings, vec!["High memory usage", "Low disk space"]);
    }

    #[test]
    fn test_percent_handles_zero_total() {
        assert_eq!(percent(5, 0), 0.0);
        assert_eq!(percent(1, 4), 25.0);
    }

    /// Accessor whose first snapshot fails and later ones succeed
    #[derive(Default)]
    struct FlakySystem {
        polls: std::sync::atomic::AtomicUsize,
    }

    impl SystemAccess for FlakySystem {
        fn system_info(&self) -> Result<SystemSnapshot> {
            if self.polls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(crate::core::error::ShellError::System("first poll".into()));
            }
            Ok(snapshot(12.0, 40.0, 50.0))
        }

        fn running_processes(&self, limit: usize) -> Result<Vec<ProcessInfo>> {
            assert_eq!(limit, 3);
            Ok(Vec::new())
        }

        fn system_health(&self) -> Result<HealthReport> {
            Ok(assess_health(&self.system_info()?, &thresholds()))
        }
    }

    #[test]
    fn test_monitor_keeps_polling_after_error_and_stops() {
        let access = Arc::new(FlakySystem::default());
        let (tx, rx) = std::sync::mpsc::channel();
        let mut monitor = SystemMonitor::start(
            Arc::clone(&access),
            Duration::from_millis(10),
            3,
            move |sample| {
                let _ = tx.send(sample);
            },
        );
        assert!(monitor.is_running());

        let first = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(first.system.cpu.usage_percent, 12.0);
        assert!(first.processes.is_empty());
        assert!(access.polls.load(Ordering::SeqCst) >= 2);

        let second = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(second.timestamp >= first.timestamp);

        monitor.stop();
        assert!(!monitor.is_running());

        let polls = access.polls.load(Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(access.polls.load(Ordering::SeqCst), polls);
    }

    #[test]
    fn test_health_serializes_uppercase() {
        let json = serde_json::to_string(&HealthStatus::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
    }
}
