use std::collections::HashMap;
use std::env;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, OnceLock};

use chrono::Local;
use flate2::{write::GzEncoder, Compression};
use fs2::FileExt;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

const DEBUG_ENV: &str = "HTTPSTATUS_DEBUG";
const LOG_DIR_ENV: &str = "HTTPSTATUS_LOG_DIR";
const LOG_FILE_NAME: &str = "httpstatus-debug.log";
const LOG_ROTATION_SIZE_MB: u64 = 8;
const MAX_ARCHIVES: usize = 5;
const ROTATION_CHECK_INTERVAL: u32 = 200;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub component: String,
    pub event: String,
    pub message: String,
    pub correlation_id: Option<String>,
    pub fields: HashMap<String, Value>,
}

struct RotatingLogger {
    log_path: PathBuf,
    write_count: AtomicU32,
}

impl RotatingLogger {
    fn new(log_path: PathBuf) -> Self {
        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        Self {
            log_path,
            write_count: AtomicU32::new(0),
        }
    }

    fn append(&self, json_line: &str) -> io::Result<()> {
        if self.write_count.fetch_add(1, Ordering::Relaxed) % ROTATION_CHECK_INTERVAL == 0 {
            // rotation failures must not stop logging
            let _ = self.rotate_if_needed();
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        writeln!(file, "{}", json_line)
    }

    fn rotate_if_needed(&self) -> io::Result<()> {
        if !self.needs_rotation()? {
            return Ok(());
        }

        // Several probe workers may share one log file
        let lock_path = self.log_path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;

        if lock_file.try_lock_exclusive().is_err() {
            return Ok(());
        }
        let result = if self.needs_rotation()? {
            self.rotate()
        } else {
            Ok(())
        };
        let _ = std::fs::remove_file(&lock_path);
        result
    }

    fn needs_rotation(&self) -> io::Result<bool> {
        match std::fs::metadata(&self.log_path) {
            Ok(metadata) => Ok(metadata.len() >= LOG_ROTATION_SIZE_MB * 1024 * 1024),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn log_dir_and_stem(&self) -> io::Result<(&Path, String)> {
        let dir = self
            .log_path
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "log path has no parent"))?;
        let stem = self
            .log_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "log path has no file name"))?;
        Ok((dir, stem))
    }

    fn rotate(&self) -> io::Result<()> {
        let (dir, stem) = self.log_dir_and_stem()?;
        let archive_path = dir.join(format!(
            "{}.{}.gz",
            stem,
            Local::now().format("%Y%m%d_%H%M%S")
        ));

        let staging_path = self.log_path.with_extension("rotating");
        std::fs::rename(&self.log_path, &staging_path)?;

        let mut encoder = GzEncoder::new(File::create(&archive_path)?, Compression::default());
        io::copy(&mut BufReader::new(File::open(&staging_path)?), &mut encoder)?;
        encoder.finish()?;
        std::fs::remove_file(&staging_path)?;

        let _ = self.prune_archives();
        Ok(())
    }

    fn prune_archives(&self) -> io::Result<()> {
        let (dir, stem) = self.log_dir_and_stem()?;
        let prefix = format!("{}.", stem);

        let mut archives = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(&prefix) && name.ends_with(".gz") {
                archives.push((entry.path(), entry.metadata()?.modified()?));
            }
        }

        archives.sort_by_key(|(_, modified)| *modified);
        let excess = archives.len().saturating_sub(MAX_ARCHIVES);
        for (path, _) in archives.into_iter().take(excess) {
            let _ = std::fs::remove_file(path);
        }
        Ok(())
    }
}

/// JSON Lines debug logger for probe workers
///
/// Disabled unless `HTTPSTATUS_DEBUG` is truthy; a disabled logger does no I/O.
/// Messages pass through redaction before they are written, since certificate
/// passwords travel with the configuration.
pub struct EnhancedDebugLogger {
    enabled: bool,
    rotating_logger: Option<Mutex<RotatingLogger>>,
    session_id: String,
    redaction_patterns: Vec<Regex>,
}

impl EnhancedDebugLogger {
    pub fn new() -> Self {
        if Self::parse_debug_enabled() {
            Self::with_log_path(Self::default_log_path())
        } else {
            Self::build(None)
        }
    }

    /// Enabled logger writing to an explicit file
    pub fn with_log_path(log_path: PathBuf) -> Self {
        Self::build(Some(log_path))
    }

    pub fn disabled() -> Self {
        Self::build(None)
    }

    fn build(log_path: Option<PathBuf>) -> Self {
        Self {
            enabled: log_path.is_some(),
            rotating_logger: log_path.map(|path| Mutex::new(RotatingLogger::new(path))),
            session_id: Uuid::new_v4().to_string()[..8].to_string(),
            redaction_patterns: Self::compile_redaction_patterns(),
        }
    }

    /// Accepts true/false, 1/0, yes/no, on/off (case insensitive)
    fn parse_debug_enabled() -> bool {
        env::var(DEBUG_ENV)
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on"))
            .unwrap_or(false)
    }

    pub fn default_log_path() -> PathBuf {
        let dir = match env::var(LOG_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".httpstatus"),
        };
        dir.join(LOG_FILE_NAME)
    }

    fn compile_redaction_patterns() -> Vec<Regex> {
        [
            r"(?i)authorization[:=\s]+[^\s,]+",
            r"(?i)bearer[:\s]+[^\s,]+",
            r"(?i)token[:=\s]+[^\s,]+",
            r"(?i)passw(or)?d[:=\s]+[^\s,]+",
            r"(?i)pki_?passwd[:=\s]+[^\s,]+",
            r"(?i)secret[:=\s]+[^\s,]+",
        ]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
    }

    pub fn redact_sensitive_data(&self, text: &str) -> String {
        self.redaction_patterns
            .iter()
            .fold(text.to_string(), |acc, regex| {
                regex.replace_all(&acc, "[REDACTED]").to_string()
            })
    }

    fn log(
        &self,
        level: &str,
        component: &str,
        event: &str,
        message: &str,
        correlation_id: Option<String>,
        fields: HashMap<String, Value>,
    ) {
        if !self.enabled {
            return;
        }

        let entry = LogEntry {
            timestamp: Local::now().to_rfc3339(),
            level: level.to_string(),
            component: component.to_string(),
            event: event.to_string(),
            message: self.redact_sensitive_data(message),
            correlation_id: correlation_id.or_else(|| Some(self.session_id.clone())),
            fields,
        };

        if let Some(logger) = &self.rotating_logger {
            if let (Ok(logger), Ok(json_line)) = (logger.lock(), serde_json::to_string(&entry)) {
                let _ = logger.append(&json_line);
            }
        }
    }

    pub fn debug(&self, component: &str, event: &str, message: &str) {
        self.log("DEBUG", component, event, message, None, HashMap::new());
    }

    pub fn info(&self, component: &str, event: &str, message: &str) {
        self.log("INFO", component, event, message, None, HashMap::new());
    }

    pub fn error(&self, component: &str, event: &str, message: &str) {
        self.log("ERROR", component, event, message, None, HashMap::new());
    }

    pub fn probe_start(&self, url: &str, with_certificate: bool, correlation_id: String) {
        let mut fields = HashMap::new();
        fields.insert("url".to_string(), Value::from(url));
        fields.insert("client_certificate".to_string(), Value::from(with_certificate));

        self.log(
            "PROBE",
            "ProbeExecutor",
            "probe_start",
            &format!("Probing {}", url),
            Some(correlation_id),
            fields,
        );
    }

    pub fn probe_end(&self, status: u16, elapsed_seconds: f64, error: &str, correlation_id: String) {
        let mut fields = HashMap::new();
        fields.insert("status".to_string(), Value::from(status));
        fields.insert("elapsed_seconds".to_string(), Value::from(elapsed_seconds));
        if !error.is_empty() {
            fields.insert("error".to_string(), Value::from(self.redact_sensitive_data(error)));
        }

        self.log(
            "PROBE",
            "ProbeExecutor",
            "probe_end",
            &format!("Probe completed: {} ({:.3}s)", status, elapsed_seconds),
            Some(correlation_id),
            fields,
        );
    }

    pub fn tick_complete(&self, asset: &str, status: u16, tick: u64) {
        let mut fields = HashMap::new();
        fields.insert("asset".to_string(), Value::from(asset));
        fields.insert("status".to_string(), Value::from(status));
        fields.insert("tick".to_string(), Value::from(tick));

        self.log(
            "DEBUG",
            "ScheduledTask",
            "tick_complete",
            &format!("Tick {} for {} emitted status {}", tick, asset, status),
            None,
            fields,
        );
    }

    pub fn sink_error(&self, asset: &str, error: &str) {
        let mut fields = HashMap::new();
        fields.insert("asset".to_string(), Value::from(asset));

        self.log(
            "ERROR",
            "IngestSink",
            "sink_error",
            &format!("Failed to ingest reading: {}", error),
            None,
            fields,
        );
    }

    pub fn lifecycle(&self, event: &str, asset: &str, message: &str) {
        let mut fields = HashMap::new();
        fields.insert("asset".to_string(), Value::from(asset));

        self.log("INFO", "Lifecycle", event, message, None, fields);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn get_session_id(&self) -> &str {
        &self.session_id
    }
}

impl Default for EnhancedDebugLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide logger, configured from the environment on first use
pub fn get_debug_logger() -> &'static EnhancedDebugLogger {
    static LOGGER: OnceLock<EnhancedDebugLogger> = OnceLock::new();
    LOGGER.get_or_init(EnhancedDebugLogger::new)
}
