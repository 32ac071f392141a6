//! Collaborator traits for the scan pipeline.
//!
//! The broker consumer and the schema registry client live outside this
//! crate. The scan loop, the classifier and the lag reporter only see them
//! through the traits defined here, which keeps the decision logic testable
//! with in-memory fakes.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::Result;
use crate::record::Record;

/// Result of one poll against the broker.
#[derive(Debug)]
pub enum PollEvent {
    /// A record was delivered.
    Record(Record),
    /// The transport reported an error. The scan stops on this event.
    Error(String),
    /// Nothing arrived within the poll timeout.
    Idle,
}

/// Source of records for the scan loop.
#[async_trait]
pub trait RecordSource: Send {
    /// Wait up to `timeout` for the next event.
    async fn poll(&mut self, timeout: Duration) -> PollEvent;

    /// Release the underlying connection.
    async fn close(&mut self);
}

/// Read-only view of partition metadata and watermarks for a topic.
#[async_trait]
pub trait WatermarkSource: Send + Sync {
    /// Partition ids currently known for `topic`.
    async fn partitions(&self, topic: &str, timeout: Duration) -> Result<Vec<i32>>;

    /// High watermark (next offset to be written) of one partition.
    async fn high_watermark(&self, topic: &str, partition: i32, timeout: Duration)
        -> Result<i64>;
}

/// Failure to resolve a schema id against the registry.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ResolveError(pub String);

impl ResolveError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Resolves a schema id to the registry's schema type tag.
///
/// `Ok(None)` means the registry returned no type, which registries use for
/// Avro. Otherwise the raw tag is returned (`"JSON"`, `"PROTOBUF"`, ...).
#[async_trait]
pub trait SchemaTypeResolver: Send + Sync {
    async fn lookup(&self, schema_id: u32) -> std::result::Result<Option<String>, ResolveError>;
}

#[async_trait]
impl<T: SchemaTypeResolver + ?Sized> SchemaTypeResolver for std::sync::Arc<T> {
    async fn lookup(&self, schema_id: u32) -> std::result::Result<Option<String>, ResolveError> {
        (**self).lookup(schema_id).await
    }
}

#[async_trait]
impl<T: WatermarkSource + ?Sized> WatermarkSource for std::sync::Arc<T> {
    async fn partitions(&self, topic: &str, timeout: Duration) -> Result<Vec<i32>> {
        (**self).partitions(topic, timeout).await
    }

    async fn high_watermark(
        &self,
        topic: &str,
        partition: i32,
        timeout: Duration,
    ) -> Result<i64> {
        (**self).high_watermark(topic, partition, timeout).await
    }
}
