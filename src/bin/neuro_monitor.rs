//! System Monitor
//! Polls system statistics at a fixed interval and prints one line per sample

use clap::Parser;
use neuro_shell::core::error::Result;
use neuro_shell::core::{config, set_config, ShellConfig};
use neuro_shell::services::system_manager::{assess_health, HealthThresholds, MonitorSample};
use neuro_shell::services::{SysinfoSystemManager, SystemMonitor};
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// System Monitor - periodic CPU, memory and disk report
#[derive(Parser, Debug)]
#[command(name = "neuro-monitor")]
#[command(about = "Print system usage and health at a fixed interval")]
struct Args {
    /// TOML file overriding the default configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seconds between samples (defaults to the configured interval)
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Stop after this many samples (0 runs until interrupted)
    #[arg(long, default_value_t = 10)]
    iterations: u64,

    /// Processes listed per sample
    #[arg(long, default_value_t = 3)]
    top: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("neuro_shell=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Some(path) = &args.config {
        if set_config(ShellConfig::load(path)?).is_err() {
            tracing::warn!("config already initialized; ignoring {}", path.display());
        }
    }

    let interval = Duration::from_secs(args.interval_secs.unwrap_or(config().monitor_interval_secs));
    let thresholds = HealthThresholds::from(config());
    let access = Arc::new(SysinfoSystemManager::with_thresholds(thresholds));

    let (tx, rx) = mpsc::channel::<MonitorSample>();
    let mut monitor = SystemMonitor::start(access, interval, args.top, move |sample| {
        // Receiver gone means we are shutting down
        let _ = tx.send(sample);
    });

    let mut received = 0u64;
    while args.iterations == 0 || received < args.iterations {
        let Ok(sample) = rx.recv() else { break };
        received += 1;

        let health = assess_health(&sample.system, &thresholds);
        println!(
            "[{}] CPU: {:.1}%  RAM: {:.1}%  Disk: {:.1}%  {:?}",
            sample.timestamp.format("%Y-%m-%d %H:%M:%S"),
            sample.system.cpu.usage_percent,
            sample.system.memory.used_percent,
            sample.system.disk.used_percent,
            health.status,
        );
        for warning in &health.warnings {
            println!("    ! {}", warning);
        }
        for process in &sample.processes {
            println!(
                "    {:>7}  {:<24} {:>5.1}% cpu  {:>5.1}% mem",
                process.pid, process.name, process.cpu_percent, process.memory_percent
            );
        }
    }

    monitor.stop();
    Ok(())
}
