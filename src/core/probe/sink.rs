//! Ingest sinks
//!
//! The sink is the downstream collaborator that receives one reading per tick.
//! It is registered once per plugin instance and shared read-only by every tick.

use crate::core::probe::types::Reading;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::mpsc;

pub trait IngestSink: Send + Sync {
    fn ingest(&self, reading: Reading) -> Result<(), String>;
}

impl<F> IngestSink for F
where
    F: Fn(Reading) -> Result<(), String> + Send + Sync,
{
    fn ingest(&self, reading: Reading) -> Result<(), String> {
        self(reading)
    }
}

/// Writes each reading as one JSON line on stdout
#[derive(Debug, Default)]
pub struct StdoutSink;

impl IngestSink for StdoutSink {
    fn ingest(&self, reading: Reading) -> Result<(), String> {
        let line = reading.to_json_line().map_err(|e| e.to_string())?;
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", line).map_err(|e| e.to_string())?;
        stdout.flush().map_err(|e| e.to_string())
    }
}

/// Appends each reading as one JSON line to a file
pub struct JsonlFileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlFileSink {
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IngestSink for JsonlFileSink {
    fn ingest(&self, reading: Reading) -> Result<(), String> {
        let line = reading.to_json_line().map_err(|e| e.to_string())?;
        let mut file = self
            .file
            .lock()
            .map_err(|_| format!("{} writer poisoned", self.path.display()))?;
        writeln!(file, "{}", line).map_err(|e| format!("{}: {}", self.path.display(), e))
    }
}

/// Forwards readings into a tokio channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Reading>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Reading>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl IngestSink for ChannelSink {
    fn ingest(&self, reading: Reading) -> Result<(), String> {
        self.tx
            .send(reading)
            .map_err(|_| "reading receiver dropped".to_string())
    }
}
