//! Access log sinks.
//!
//! # Responsibilities
//! - Accept one record per served redirect
//! - Report failures as values; the engine decides what to do with them
//!
//! # Design Decisions
//! - Sinks are write-only; nothing in the request path reads them back
//! - The file sink writes JSON lines and never rewrites earlier entries

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::access_log::record::AccessLogRecord;
use crate::config::schema::{AccessLogConfig, AccessLogSinkKind};

/// Errors raised while writing an access log record.
#[derive(Debug, Error)]
pub enum AccessLogError {
    #[error("access log I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("access log serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("access log unavailable: {0}")]
    Unavailable(String),
}

/// Write-only destination for access log records.
#[async_trait]
pub trait AccessLogSink: Send + Sync + 'static {
    async fn record(&self, record: AccessLogRecord) -> Result<(), AccessLogError>;
}

/// Emits each record as a structured `tracing` event on the `access_log` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAccessLog;

#[async_trait]
impl AccessLogSink for TracingAccessLog {
    async fn record(&self, record: AccessLogRecord) -> Result<(), AccessLogError> {
        tracing::info!(
            target: "access_log",
            rule_id = record.rule_id,
            request_domain = %record.request_domain,
            request_path = %record.request_path,
            request_method = %record.request_method,
            request_url = %record.request_url,
            destination_url = %record.destination_url,
            status_code = record.status_code,
            ip_address = ?record.ip_address,
            user_agent = %record.user_agent,
            referer = %record.referer,
            created_at = %record.created_at.to_rfc3339(),
            "redirect"
        );
        Ok(())
    }
}

/// Discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAccessLog;

#[async_trait]
impl AccessLogSink for NoopAccessLog {
    async fn record(&self, _record: AccessLogRecord) -> Result<(), AccessLogError> {
        Ok(())
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemoryAccessLog {
    records: Mutex<Vec<AccessLogRecord>>,
}

impl MemoryAccessLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn records(&self) -> Vec<AccessLogRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AccessLogSink for MemoryAccessLog {
    async fn record(&self, record: AccessLogRecord) -> Result<(), AccessLogError> {
        self.records
            .lock()
            .map_err(|_| AccessLogError::Unavailable("memory log poisoned".into()))?
            .push(record);
        Ok(())
    }
}

/// Appends records to a file, one JSON object per line.
#[derive(Debug)]
pub struct JsonLinesAccessLog {
    path: PathBuf,
    file: tokio::sync::Mutex<File>,
}

impl JsonLinesAccessLog {
    /// Open (or create) the log file in append mode.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, AccessLogError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        Ok(Self {
            path,
            file: tokio::sync::Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AccessLogSink for JsonLinesAccessLog {
    async fn record(&self, record: AccessLogRecord) -> Result<(), AccessLogError> {
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');

        let mut file = self.file.lock().await;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Build the sink selected in configuration.
pub async fn build_sink(config: &AccessLogConfig) -> Result<Arc<dyn AccessLogSink>, AccessLogError> {
    let sink: Arc<dyn AccessLogSink> = match config.sink {
        AccessLogSinkKind::Tracing => Arc::new(TracingAccessLog),
        AccessLogSinkKind::Disabled => Arc::new(NoopAccessLog),
        AccessLogSinkKind::File => {
            let path = config.path.as_deref().ok_or_else(|| {
                AccessLogError::Unavailable("file sink configured without a path".into())
            })?;
            let sink = JsonLinesAccessLog::open(path).await?;
            tracing::info!(path = ?sink.path(), "Access log file opened");
            Arc::new(sink)
        }
    };
    Ok(sink)
}
