//! Anomaly Log
//!
//! Records that are malformed, fail schema lookup or carry an unwanted
//! encoding are reported twice: as a structured log line and as a row in a
//! durable, append-only CSV file (`partition,offset,reason`).
//!
//! Rows are flushed before [`AnomalyLog::report`] returns, so the anomaly
//! trail survives a crash at the cost of one flush per anomalous record.

use std::fs::{File, OpenOptions};
use std::path::Path;

use tracing::error;

use crate::error::Result;
use crate::record::Record;

/// Default anomaly file name
pub const DEFAULT_ANOMALY_FILE: &str = "interesting.csv";

/// One anomalous record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnomalyRow {
    pub partition: i32,
    pub offset: i64,
    pub reason: String,
}

/// Destination for anomaly rows.
pub trait AnomalySink: Send {
    /// Append one row and make it durable before returning.
    fn append(&mut self, row: &AnomalyRow) -> Result<()>;
}

/// CSV file sink opened in append mode; existing rows are never truncated.
pub struct CsvAnomalySink {
    writer: csv::Writer<File>,
}

impl CsvAnomalySink {
    /// Open (or create) `path` for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        Ok(Self { writer })
    }
}

impl AnomalySink for CsvAnomalySink {
    fn append(&mut self, row: &AnomalyRow) -> Result<()> {
        self.writer.write_record([
            row.partition.to_string(),
            row.offset.to_string(),
            row.reason.clone(),
        ])?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Logs anomalous records and appends them to a sink.
pub struct AnomalyLog {
    sink: Box<dyn AnomalySink>,
    written: u64,
}

impl AnomalyLog {
    pub fn new(sink: Box<dyn AnomalySink>) -> Self {
        Self { sink, written: 0 }
    }

    /// Report one anomalous record.
    ///
    /// The log line is always emitted. A failed append is returned to the
    /// caller, which decides whether to keep scanning.
    pub fn report(&mut self, record: &Record, reason: &str) -> Result<()> {
        error!(
            topic = %record.topic,
            partition = record.partition,
            offset = record.offset,
            "{}: {}",
            reason,
            record.coordinates()
        );

        let row = AnomalyRow {
            partition: record.partition,
            offset: record.offset,
            reason: reason.to_string(),
        };
        self.sink.append(&row)?;
        self.written += 1;
        Ok(())
    }

    /// Rows successfully written by this log
    pub fn written(&self) -> u64 {
        self.written
    }
}
