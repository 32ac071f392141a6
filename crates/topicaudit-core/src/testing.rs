//! In-memory fakes of the collaborator traits, shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::anomaly::{AnomalyRow, AnomalySink};
use crate::error::{AuditError, Result};
use crate::source::{PollEvent, RecordSource, ResolveError, SchemaTypeResolver, WatermarkSource};

/// Resolver backed by a fixed id → type table. Unknown ids fail.
#[derive(Clone, Default)]
pub struct MockResolver {
    types: Arc<HashMap<u32, std::result::Result<Option<String>, String>>>,
    calls: Arc<AtomicUsize>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, schema_id: u32, schema_type: Option<&str>) -> Self {
        Arc::make_mut(&mut self.types).insert(schema_id, Ok(schema_type.map(str::to_string)));
        self
    }

    pub fn with_failure(mut self, schema_id: u32, reason: &str) -> Self {
        Arc::make_mut(&mut self.types).insert(schema_id, Err(reason.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SchemaTypeResolver for MockResolver {
    async fn lookup(&self, schema_id: u32) -> std::result::Result<Option<String>, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.types.get(&schema_id) {
            Some(Ok(schema_type)) => Ok(schema_type.clone()),
            Some(Err(reason)) => Err(ResolveError::new(reason.clone())),
            None => Err(ResolveError::new(format!("Schema {} not found", schema_id))),
        }
    }
}

/// Record source that replays a fixed list of events, then reports a
/// transport error once the script runs out.
pub struct ScriptedSource {
    events: VecDeque<PollEvent>,
    closed: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(events: Vec<PollEvent>) -> Self {
        Self {
            events: events.into(),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn close_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.closed)
    }
}

#[async_trait]
impl RecordSource for ScriptedSource {
    async fn poll(&mut self, _timeout: Duration) -> PollEvent {
        self.events
            .pop_front()
            .unwrap_or_else(|| PollEvent::Error("script exhausted".to_string()))
    }

    async fn close(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Watermark source with fixed high watermarks per partition.
#[derive(Default)]
pub struct StaticWatermarks {
    highs: Mutex<HashMap<i32, i64>>,
    fail_metadata: bool,
    fail_partition: Option<i32>,
}

impl StaticWatermarks {
    pub fn new(highs: &[(i32, i64)]) -> Self {
        Self {
            highs: Mutex::new(highs.iter().copied().collect()),
            ..Default::default()
        }
    }

    pub fn failing_metadata() -> Self {
        Self {
            fail_metadata: true,
            ..Default::default()
        }
    }

    pub fn failing_partition(mut self, partition: i32) -> Self {
        self.fail_partition = Some(partition);
        self
    }

    pub fn set_high(&self, partition: i32, high: i64) {
        self.highs.lock().unwrap().insert(partition, high);
    }
}

#[async_trait]
impl WatermarkSource for StaticWatermarks {
    async fn partitions(&self, topic: &str, _timeout: Duration) -> Result<Vec<i32>> {
        if self.fail_metadata {
            return Err(AuditError::Metadata {
                topic: topic.to_string(),
                reason: "broker unavailable".to_string(),
            });
        }
        let mut ids: Vec<i32> = self.highs.lock().unwrap().keys().copied().collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn high_watermark(
        &self,
        _topic: &str,
        partition: i32,
        _timeout: Duration,
    ) -> Result<i64> {
        if self.fail_partition == Some(partition) {
            return Err(AuditError::Watermark {
                partition,
                reason: "request timed out".to_string(),
            });
        }
        Ok(self.highs.lock().unwrap().get(&partition).copied().unwrap_or(0))
    }
}

/// In-memory anomaly sink; clones share the same rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryAnomalySink {
    rows: Arc<Mutex<Vec<AnomalyRow>>>,
}

impl MemoryAnomalySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> Vec<AnomalyRow> {
        self.rows.lock().unwrap().clone()
    }
}

impl AnomalySink for MemoryAnomalySink {
    fn append(&mut self, row: &AnomalyRow) -> Result<()> {
        self.rows.lock().unwrap().push(row.clone());
        Ok(())
    }
}

/// Anomaly sink whose writes always fail, like a full disk.
#[derive(Debug, Clone, Default)]
pub struct FailingAnomalySink {
    attempts: Arc<AtomicUsize>,
}

impl FailingAnomalySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl AnomalySink for FailingAnomalySink {
    fn append(&mut self, _row: &AnomalyRow) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(AuditError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "no space left on device",
        )))
    }
}
