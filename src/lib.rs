//! httpstatus - periodic HTTP status probe
//!
//! Issues one GET per interval to a configured URL and delivers a reading with
//! status code, elapsed time and error text to an ingest sink. The lifecycle
//! functions in [`core::probe`] mirror a south plugin's host contract.

pub mod cli;
pub mod config;
pub mod core;
