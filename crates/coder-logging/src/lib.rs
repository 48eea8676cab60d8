//! Structured per-module JSONL logging.
//!
//! One `StructuredLogger` per module (`coder`, `researcher`, `secretary`,
//! `daemon`, ...). Every entry also mirrors to the console via `tracing`,
//! stderr-init style, but the JSONL file is the durable, queryable
//! record.

mod paths;
mod query;

pub use paths::{default_logs_dir, APP_NAME};
pub use query::LogQuery;

use chrono::Utc;
use coder_core::{LogEvent, LogLevel};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Writes one JSONL line per event to `logs/<module>-YYYYMMDD.jsonl` under
/// `logs_dir`, guarded by a mutex (one append-writer per day per module,
/// to keep writers from stepping on each other).
pub struct StructuredLogger {
    module: String,
    logs_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl StructuredLogger {
    pub fn new(module: impl Into<String>, logs_dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let logs_dir = logs_dir.into();
        std::fs::create_dir_all(&logs_dir)?;
        Ok(Self {
            module: module.into(),
            logs_dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn for_module(module: impl Into<String>) -> std::io::Result<Self> {
        Self::new(module, default_logs_dir())
    }

    fn file_path_for(&self, timestamp: chrono::DateTime<Utc>) -> PathBuf {
        self.logs_dir.join(format!(
            "{}-{}.jsonl",
            self.module,
            timestamp.format("%Y%m%d")
        ))
    }

    fn write_event(&self, event: &LogEvent) {
        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(error) => {
                tracing::error!(error = %error, "failed to serialize log event");
                return;
            }
        };

        let path = self.file_path_for(event.timestamp);
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| writeln!(file, "{line}"));
        if let Err(error) = result {
            tracing::error!(path = %path.display(), error = %error, "failed to write log event");
        }
    }

    fn mirror_to_console(&self, event: &LogEvent) {
        match event.level {
            LogLevel::Debug => tracing::debug!(logger = %event.logger_name, "{}", event.message),
            LogLevel::Info => tracing::info!(logger = %event.logger_name, "{}", event.message),
            LogLevel::Warn => tracing::warn!(logger = %event.logger_name, "{}", event.message),
            LogLevel::Error => tracing::error!(logger = %event.logger_name, "{}", event.message),
        }
    }

    pub fn log(&self, event: LogEventBuilder) {
        let event = event.build(&self.module);
        self.mirror_to_console(&event);
        self.write_event(&event);
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    /// Diagnostic-only read: query recent entries for this module's day
    /// files. The logger never reads back from disk for its own behavior.
    pub fn query(&self, query: &LogQuery) -> Vec<LogEvent> {
        query::run(&self.logs_dir, &self.module, query)
    }
}

/// Builder for one log entry; `StructuredLogger::log` stamps the
/// timestamp and logger name at write time.
#[derive(Debug, Clone, Default)]
pub struct LogEventBuilder {
    level: Option<LogLevel>,
    message: String,
    session_id: Option<String>,
    task_id: Option<String>,
    cli_name: Option<String>,
    model: Option<String>,
    extra: BTreeMap<String, Value>,
}

impl LogEventBuilder {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level: Some(level),
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warn, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Debug, message)
    }

    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    pub fn cli_name(mut self, cli_name: impl Into<String>) -> Self {
        self.cli_name = Some(cli_name.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    fn build(self, logger_name: &str) -> LogEvent {
        LogEvent {
            timestamp: Utc::now(),
            level: self.level.unwrap_or(LogLevel::Info),
            logger_name: logger_name.to_string(),
            message: self.message,
            session_id: self.session_id,
            task_id: self.task_id,
            cli_name: self.cli_name,
            model: self.model,
            extra: self.extra,
        }
    }
}

/// Install the console mirror for the whole process, stderr writer with
/// `RUST_LOG`-style filtering. Idempotent: later calls are no-ops.
pub fn init_console_subscriber() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();
}
