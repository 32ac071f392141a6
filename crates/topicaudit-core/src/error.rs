//! Error Types for topicaudit
//!
//! ## Error Categories
//!
//! ### I/O Errors
//! - Opening or writing the anomaly file
//!
//! ### Broker Errors
//! - `Metadata`: topic metadata could not be fetched during a reporting tick
//! - `Watermark`: a partition's high watermark could not be fetched
//! - `TopicNotFound`: the broker does not know the scanned topic
//!
//! ### Configuration Errors
//! - `InvalidWantedEncoding`: the `--want` value is not a known encoding
//!
//! Per-record problems (empty payloads, bad framing, failed schema lookups)
//! are not errors; they are classifications and are counted instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to get metadata for topic {topic}: {reason}")]
    Metadata { topic: String, reason: String },

    #[error("Topic {0} not found in metadata")]
    TopicNotFound(String),

    #[error("Failed to query watermark offsets for partition {partition}: {reason}")]
    Watermark { partition: i32, reason: String },

    #[error("invalid --want argument: {0}")]
    InvalidWantedEncoding(String),
}

pub type Result<T> = std::result::Result<T, AuditError>;
