//! Core type definitions used throughout the codebase

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequence number of a submitted command
///
/// Assigned by the dispatcher at submission, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("#{}", self.0))
    }
}

/// Wall-clock instant attached to records
pub type Timestamp = DateTime<Utc>;

/// Current wall-clock time
pub fn now() -> Timestamp {
    Utc::now()
}

/// Seconds since the Unix epoch, with sub-second precision
pub fn unix_seconds(ts: &Timestamp) -> f64 {
    ts.timestamp_millis() as f64 / 1000.0
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Bytes to gigabytes, rounded to two decimals
pub fn bytes_to_gb(bytes: u64) -> f64 {
    round2(bytes as f64 / (1024.0 * 1024.0 * 1024.0))
}

/// Bytes to megabytes, rounded to two decimals
pub fn bytes_to_mb(bytes: u64) -> f64 {
    round2(bytes as f64 / (1024.0 * 1024.0))
}
