//! topicaudit core
//!
//! Classifies the serialization framing of records read from a Kafka topic
//! and keeps running statistics about what was seen.
//!
//! ## Pipeline
//!
//! ```text
//! RecordSource ──► ScanLoop ──► Classifier ──► StatsAccumulator
//!                                   │                ▲
//!                                   ▼                │ snapshot()
//!                               AnomalyLog      LagReporter ◄── WatermarkSource
//! ```
//!
//! The broker, the schema registry and the anomaly file are reached through
//! the traits in [`source`] and [`anomaly`], so everything in this crate can
//! be exercised without a running cluster.

pub mod anomaly;
pub mod classification;
pub mod classifier;
pub mod error;
pub mod framing;
pub mod record;
pub mod report;
pub mod reporter;
pub mod scan;
pub mod source;
pub mod stats;

pub use anomaly::{AnomalyLog, AnomalyRow, AnomalySink, CsvAnomalySink};
pub use classification::{Classification, ClassificationTag, WantedEncoding};
pub use classifier::Classifier;
pub use error::{AuditError, Result};
pub use framing::{inspect_framing, Framing};
pub use record::Record;
pub use report::{LagReport, PartitionLag};
pub use reporter::{LagReporter, ReporterConfig};
pub use scan::{NoProgress, ProgressIndicator, ScanLoop, ScanState, ScanSummary};
pub use source::{PollEvent, RecordSource, ResolveError, SchemaTypeResolver, WatermarkSource};
pub use stats::{StatsAccumulator, StatsSnapshot};

#[cfg(test)]
pub(crate) mod testing;
