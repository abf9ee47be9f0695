//! Probe module tests
//!
//! Executor, reading builder, sinks, scheduler and lifecycle, all driven
//! through stub transports and recording sinks

pub mod executor_tests;
pub mod reading_tests;
