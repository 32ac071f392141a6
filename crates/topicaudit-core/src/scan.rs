//! Scan Loop
//!
//! Drives the audit: polls the record source, classifies each record,
//! updates the shared statistics and routes anomalies to the anomaly log.
//!
//! ## States
//!
//! ```text
//! Running ──(transport error)──► Stopped
//!    ▲  │
//!    └──┘ record / idle poll
//! ```
//!
//! The loop only stops on a transport error from the source. Idle polls are
//! the normal waiting path. On stop the source is closed and a
//! [`ScanSummary`] is returned to the caller.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::anomaly::AnomalyLog;
use crate::classification::{Classification, WantedEncoding};
use crate::classifier::Classifier;
use crate::record::Record;
use crate::source::{PollEvent, RecordSource, SchemaTypeResolver};
use crate::stats::StatsAccumulator;

/// Default bounded wait for each poll
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Progress display advanced once per processed record.
pub trait ProgressIndicator: Send {
    fn inc(&self, delta: u64);

    fn finish(&self) {}
}

/// Progress indicator that shows nothing.
pub struct NoProgress;

impl ProgressIndicator for NoProgress {
    fn inc(&self, _delta: u64) {}
}

/// Lifecycle of the scan loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Running,
    Stopped,
}

/// What happened during a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    /// Records classified
    pub processed: u64,
    /// Anomaly rows written
    pub anomalies: u64,
    /// Transport error that stopped the scan
    pub stop_reason: String,
}

/// Polls a source and classifies every record it delivers.
pub struct ScanLoop<S, R> {
    source: S,
    classifier: Classifier<R>,
    stats: Arc<StatsAccumulator>,
    anomalies: AnomalyLog,
    wanted: Option<WantedEncoding>,
    progress: Box<dyn ProgressIndicator>,
    state: ScanState,
    processed: u64,
}

impl<S: RecordSource, R: SchemaTypeResolver> ScanLoop<S, R> {
    pub fn new(
        source: S,
        classifier: Classifier<R>,
        stats: Arc<StatsAccumulator>,
        anomalies: AnomalyLog,
    ) -> Self {
        Self {
            source,
            classifier,
            stats,
            anomalies,
            wanted: None,
            progress: Box::new(NoProgress),
            state: ScanState::Running,
            processed: 0,
        }
    }

    /// Flag successfully framed records whose encoding differs from `wanted`.
    pub fn with_wanted(mut self, wanted: Option<WantedEncoding>) -> Self {
        self.wanted = wanted;
        self
    }

    pub fn with_progress(mut self, progress: Box<dyn ProgressIndicator>) -> Self {
        self.progress = progress;
        self
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Run until the source reports a transport error.
    pub async fn run(mut self) -> ScanSummary {
        info!(wanted = ?self.wanted, "Scan started");

        let mut stop_reason = String::new();
        while self.state == ScanState::Running {
            match self.source.poll(DEFAULT_POLL_TIMEOUT).await {
                PollEvent::Record(record) => {
                    self.process(&record).await;
                }
                PollEvent::Error(e) => {
                    error!(error = %e, "Transport error, stopping scan");
                    stop_reason = e;
                    self.state = ScanState::Stopped;
                }
                PollEvent::Idle => {}
            }
        }

        self.source.close().await;
        self.progress.finish();

        let summary = ScanSummary {
            processed: self.processed,
            anomalies: self.anomalies.written(),
            stop_reason,
        };
        info!(
            processed = summary.processed,
            anomalies = summary.anomalies,
            "Scan stopped"
        );
        summary
    }

    /// Classify one record, count it and log it if it is anomalous.
    pub async fn process(&mut self, record: &Record) -> Classification {
        let classification = self.classifier.classify(record).await;

        self.stats
            .record(classification.tag(), record.partition, record.offset)
            .await;

        if let Some(reason) = classification.anomaly_reason(self.wanted) {
            if let Err(e) = self.anomalies.report(record, &reason) {
                warn!(
                    partition = record.partition,
                    offset = record.offset,
                    error = %e,
                    "Failed to write anomaly row"
                );
            }
        }

        self.processed += 1;
        self.progress.inc(1);
        classification
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::ClassificationTag;
    use crate::testing::{FailingAnomalySink, MemoryAnomalySink, MockResolver, ScriptedSource};
    use bytes::Bytes;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn record(offset: i64, payload: &[u8]) -> PollEvent {
        PollEvent::Record(Record::new(
            "orders",
            0,
            offset,
            Bytes::copy_from_slice(payload),
        ))
    }

    fn resolver() -> MockResolver {
        MockResolver::new()
            .with_type(7, None)
            .with_type(9, Some("JSON"))
    }

    /// empty, Avro (id 7), JSON Schema (id 9), raw JSON, unknown magic
    fn mixed_records() -> Vec<PollEvent> {
        vec![
            record(0, &[]),
            record(1, &[0x00, 0x00, 0x00, 0x00, 0x07, 0x02]),
            record(2, &[0x00, 0x00, 0x00, 0x00, 0x09, b'{']),
            record(3, br#"{"id": 1}"#),
            record(4, &[0xFF, 0x01]),
        ]
    }

    fn scan(
        events: Vec<PollEvent>,
        wanted: Option<WantedEncoding>,
    ) -> (
        ScanLoop<ScriptedSource, MockResolver>,
        Arc<StatsAccumulator>,
        MemoryAnomalySink,
    ) {
        let stats = Arc::new(StatsAccumulator::new());
        let sink = MemoryAnomalySink::new();
        let scan = ScanLoop::new(
            ScriptedSource::new(events),
            Classifier::new(resolver()),
            Arc::clone(&stats),
            AnomalyLog::new(Box::new(sink.clone())),
        )
        .with_wanted(wanted);
        (scan, stats, sink)
    }

    #[tokio::test]
    async fn test_mixed_stream_without_filter() {
        let (scan, stats, sink) = scan(mixed_records(), None);

        let summary = scan.run().await;

        let snapshot = stats.snapshot().await;
        assert_eq!(snapshot.total, 5);
        assert_eq!(snapshot.count(ClassificationTag::EmptyPayload), 1);
        assert_eq!(snapshot.count(ClassificationTag::Avro), 1);
        assert_eq!(snapshot.count(ClassificationTag::JsonSchema), 1);
        assert_eq!(snapshot.count(ClassificationTag::InvalidFramingJson), 1);
        assert_eq!(snapshot.count(ClassificationTag::InvalidFramingOther), 1);
        assert_eq!(snapshot.position(0), 4);

        // Registry-framed successes are not anomalies without a filter
        let rows = sink.rows();
        let offsets: Vec<i64> = rows.iter().map(|row| row.offset).collect();
        assert_eq!(offsets, vec![0, 3, 4]);
        assert_eq!(rows[0].reason, "empty message");
        assert_eq!(rows[1].reason, "invalid magic byte (JSON)");
        assert_eq!(rows[2].reason, "invalid magic byte");
        assert_eq!(summary.processed, 5);
        assert_eq!(summary.anomalies, 3);
    }

    #[tokio::test]
    async fn test_mixed_stream_with_protobuf_filter() {
        let (scan, stats, sink) = scan(mixed_records(), Some(WantedEncoding::Protobuf));

        scan.run().await;

        assert_eq!(stats.total().await, 5);
        let rows = sink.rows();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[1].reason, "Unwanted AVRO");
        assert_eq!(rows[2].reason, "Unwanted JSONSCHEMA");
    }

    #[tokio::test]
    async fn test_json_schema_filter_rejects_only_avro() {
        let (scan, _stats, sink) = scan(mixed_records(), Some(WantedEncoding::JsonSchema));

        scan.run().await;

        let unwanted: Vec<_> = sink
            .rows()
            .into_iter()
            .filter(|row| row.reason.starts_with("Unwanted"))
            .collect();
        assert_eq!(unwanted.len(), 1);
        assert_eq!(unwanted[0].offset, 1);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_counted_and_scan_continues() {
        let events = vec![
            record(0, &[0x00, 0x00, 0x00, 0x01, 0x00]),
            record(1, &[0x00, 0x00, 0x00, 0x00, 0x07]),
        ];
        let (scan, stats, sink) = scan(events, None);

        let summary = scan.run().await;

        assert_eq!(summary.processed, 2);
        assert_eq!(stats.count(ClassificationTag::SchemaLookupError).await, 1);
        assert_eq!(stats.count(ClassificationTag::Avro).await, 1);
        assert_eq!(sink.rows()[0].reason, "Error reading schema: 256");
    }

    #[tokio::test]
    async fn test_idle_polls_are_not_errors() {
        let events = vec![
            PollEvent::Idle,
            record(0, &[0x00, 0x00, 0x00, 0x00, 0x07]),
            PollEvent::Idle,
            PollEvent::Idle,
            record(1, &[0x00, 0x00, 0x00, 0x00, 0x07]),
        ];
        let (scan, stats, _sink) = scan(events, None);

        let summary = scan.run().await;

        assert_eq!(summary.processed, 2);
        assert_eq!(stats.position(0).await, Some(1));
    }

    #[tokio::test]
    async fn test_transport_error_stops_and_closes() {
        let events = vec![
            record(0, &[]),
            PollEvent::Error("Broker: transport failure".to_string()),
            record(1, &[]),
        ];
        let source = ScriptedSource::new(events);
        let closed = source.close_count();
        let stats = Arc::new(StatsAccumulator::new());
        let scan = ScanLoop::new(
            source,
            Classifier::new(resolver()),
            Arc::clone(&stats),
            AnomalyLog::new(Box::new(MemoryAnomalySink::new())),
        );

        let summary = scan.run().await;

        assert_eq!(summary.processed, 1);
        assert_eq!(summary.stop_reason, "Broker: transport failure");
        assert_eq!(stats.total().await, 1);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_anomaly_write_failure_does_not_stop_scan() {
        let events = vec![
            record(0, &[]),
            record(1, &[0xFF]),
            record(2, &[0x00, 0x00, 0x00, 0x00, 0x07]),
            PollEvent::Error("Broker: transport failure".to_string()),
        ];
        let sink = FailingAnomalySink::new();
        let stats = Arc::new(StatsAccumulator::new());
        let scan = ScanLoop::new(
            ScriptedSource::new(events),
            Classifier::new(resolver()),
            Arc::clone(&stats),
            AnomalyLog::new(Box::new(sink.clone())),
        );

        let summary = scan.run().await;

        assert_eq!(summary.processed, 3);
        assert_eq!(summary.anomalies, 0);
        assert_eq!(summary.stop_reason, "Broker: transport failure");
        assert_eq!(sink.attempts(), 2);
        assert_eq!(stats.total().await, 3);
        assert_eq!(stats.count(ClassificationTag::EmptyPayload).await, 1);
        assert_eq!(stats.count(ClassificationTag::InvalidFramingOther).await, 1);
        assert_eq!(stats.position(0).await, Some(2));
    }

    #[tokio::test]
    async fn test_progress_advances_per_record() {
        struct Counter(Arc<AtomicU64>);
        impl ProgressIndicator for Counter {
            fn inc(&self, delta: u64) {
                self.0.fetch_add(delta, Ordering::SeqCst);
            }
        }

        let count = Arc::new(AtomicU64::new(0));
        let (scan, _stats, _sink) = scan(mixed_records(), None);
        scan.with_progress(Box::new(Counter(Arc::clone(&count))))
            .run()
            .await;

        assert_eq!(count.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_truncated_framing_is_anomalous() {
        let (mut scan, stats, sink) = scan(vec![], None);

        let result = scan
            .process(&Record::new("orders", 2, 11, Bytes::from_static(&[0x00, 0x01])))
            .await;

        assert_eq!(result, Classification::TruncatedFraming { len: 2 });
        assert_eq!(stats.count(ClassificationTag::TruncatedFraming).await, 1);
        assert_eq!(
            sink.rows()[0].reason,
            "truncated schema registry framing (2 bytes)"
        );
        assert_eq!(scan.state(), ScanState::Running);
    }
}
