use crate::core::probe::types::{get_local_timestamp, Measurement, ProbeOutcome, Reading};
use std::sync::Arc;

/// Clock abstraction for dependency injection and testing
pub trait ClockTrait: Send + Sync {
    /// Local timestamp with timezone offset
    fn local_timestamp(&self) -> String;
}

#[derive(Default)]
pub struct SystemClock;

impl ClockTrait for SystemClock {
    fn local_timestamp(&self) -> String {
        get_local_timestamp()
    }
}

/// Wraps a probe outcome into the reading shape the ingest sink expects
pub struct ReadingBuilder {
    clock: Arc<dyn ClockTrait>,
}

impl ReadingBuilder {
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(clock: Arc<dyn ClockTrait>) -> Self {
        Self { clock }
    }

    pub fn build(&self, asset_name: &str, outcome: &ProbeOutcome, url: &str) -> Reading {
        Reading {
            asset: asset_name.to_string(),
            timestamp: self.clock.local_timestamp(),
            readings: vec![Measurement {
                status: outcome.status_code,
                time: outcome.elapsed_seconds,
                error: outcome.error_message.clone(),
                url: url.to_string(),
            }],
        }
    }
}

impl Default for ReadingBuilder {
    fn default() -> Self {
        Self::new()
    }
}
