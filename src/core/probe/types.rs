// Core types for the HTTP status probe
use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reserved status meaning the probe could not be completed
pub const SENTINEL_STATUS: u16 = 999;

const UNKNOWN_TRANSPORT_ERROR: &str = "unknown transport error";

/// Result of a single probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// HTTP status, or SENTINEL_STATUS on transport failure
    pub status_code: u16,
    /// Total request duration; 0.0 on transport failure
    pub elapsed_seconds: f64,
    /// Empty unless the probe failed
    pub error_message: String,
}

impl ProbeOutcome {
    pub fn success(status_code: u16, elapsed: Duration) -> Self {
        Self {
            status_code,
            elapsed_seconds: elapsed.as_secs_f64(),
            error_message: String::new(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        let mut error_message = error.into();
        if error_message.trim().is_empty() {
            error_message = UNKNOWN_TRANSPORT_ERROR.to_string();
        }
        Self {
            status_code: SENTINEL_STATUS,
            elapsed_seconds: 0.0,
            error_message,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status_code == SENTINEL_STATUS
    }
}

/// One measurement inside a reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub status: u16,
    pub time: f64,
    pub error: String,
    pub url: String,
}

/// Timestamped record delivered to the ingest sink on every tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub asset: String,
    /// Local time with UTC offset, e.g. `2024-05-01 13:45:12.123456+02:00`
    pub timestamp: String,
    pub readings: Vec<Measurement>,
}

impl Reading {
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Static plugin descriptor returned by plugin_info()
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub mode: String,
    #[serde(rename = "type")]
    pub plugin_type: String,
    pub interface: String,
    pub config: serde_json::Value,
}

/// Lifecycle state of a scheduled probe task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Created,
    Scheduled,
    Running,
    Cancelled,
}

impl TaskState {
    pub(crate) fn as_u8(self) -> u8 {
        match self {
            TaskState::Created => 0,
            TaskState::Scheduled => 1,
            TaskState::Running => 2,
            TaskState::Cancelled => 3,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => TaskState::Created,
            1 => TaskState::Scheduled,
            2 => TaskState::Running,
            _ => TaskState::Cancelled,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("probe task already started (state: {0:?})")]
    AlreadyStarted(TaskState),
    #[error("no probe timer is armed")]
    NotScheduled,
}

#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error("no ingest sink registered")]
    SinkNotRegistered,
    #[error("plugin is already started")]
    AlreadyStarted,
    #[error("plugin is not started")]
    NotStarted,
    #[error("HTTP transport error: {0}")]
    Transport(String),
    #[error("worker error: {0}")]
    Worker(String),
}

/// Local timestamp with microseconds and UTC offset
pub fn get_local_timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S%.6f%:z")
        .to_string()
}
