//! Kafka consumer adapter
//!
//! Wraps an `rdkafka` [`StreamConsumer`] subscribed to the audited topic and
//! exposes it through the core traits:
//!
//! - [`KafkaRecordSource`] implements `RecordSource` (bounded `recv`)
//! - [`KafkaWatermarks`] implements `WatermarkSource` (metadata + watermark
//!   queries, run on the blocking pool because librdkafka blocks)
//!
//! Both share one consumer. The record source owns it and the watermark
//! view only holds a weak handle, so closing the source releases the
//! consumer even while the reporter task is still alive. Queries after that
//! fail with a metadata error.
//!
//! ## Configuration
//!
//! Every broker property from the config file is passed to librdkafka
//! verbatim (`bootstrap.servers`, `group.id`, `security.protocol`,
//! `sasl.*`, ...). Nothing is defaulted here.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::ClientConfig;
use tracing::{debug, info};

use topicaudit_core::{AuditError, PollEvent, Record, RecordSource, WatermarkSource};

use crate::error::{ClientError, Result};

const CONSUMER_CLOSED: &str = "consumer closed";

/// Build an rdkafka [`ClientConfig`] from pass-through properties.
pub fn client_config(properties: &BTreeMap<String, String>) -> ClientConfig {
    let mut config = ClientConfig::new();
    for (key, value) in properties {
        config.set(key, value);
    }
    config
}

/// Kafka consumer subscribed to a single topic.
pub struct KafkaAuditConsumer {
    consumer: Arc<StreamConsumer>,
}

impl KafkaAuditConsumer {
    /// Create the consumer and subscribe to `topic`.
    pub fn connect(properties: &BTreeMap<String, String>, topic: &str) -> Result<Self> {
        if topic.trim().is_empty() {
            return Err(ClientError::ConfigError("topic must not be empty".to_string()));
        }

        let consumer: StreamConsumer = client_config(properties).create()?;
        consumer.subscribe(&[topic])?;

        info!(
            topic = topic,
            brokers = properties.get("bootstrap.servers").map(String::as_str).unwrap_or(""),
            "Subscribed to topic"
        );

        Ok(Self {
            consumer: Arc::new(consumer),
        })
    }

    /// Split into the record source, which owns the consumer, and a
    /// metadata / watermark view that does not keep it alive.
    pub fn into_parts(self) -> (KafkaRecordSource, KafkaWatermarks) {
        let watermarks = KafkaWatermarks {
            consumer: Arc::downgrade(&self.consumer),
        };
        let source = KafkaRecordSource {
            consumer: Some(self.consumer),
        };
        (source, watermarks)
    }
}

/// `RecordSource` backed by a Kafka consumer.
pub struct KafkaRecordSource {
    consumer: Option<Arc<StreamConsumer>>,
}

#[async_trait]
impl RecordSource for KafkaRecordSource {
    async fn poll(&mut self, timeout: Duration) -> PollEvent {
        let Some(consumer) = &self.consumer else {
            return PollEvent::Error(CONSUMER_CLOSED.to_string());
        };

        match tokio::time::timeout(timeout, consumer.recv()).await {
            Ok(Ok(message)) => PollEvent::Record(Record::new(
                message.topic(),
                message.partition(),
                message.offset(),
                message
                    .payload()
                    .map(Bytes::copy_from_slice)
                    .unwrap_or_default(),
            )),
            Ok(Err(e)) => PollEvent::Error(e.to_string()),
            Err(_) => PollEvent::Idle,
        }
    }

    async fn close(&mut self) {
        if let Some(consumer) = self.consumer.take() {
            consumer.unsubscribe();
            // Dropping the last strong handle closes the consumer
            drop(consumer);
            debug!("Consumer closed");
        }
    }
}

/// `WatermarkSource` backed by a Kafka consumer.
#[derive(Clone)]
pub struct KafkaWatermarks {
    consumer: Weak<StreamConsumer>,
}

impl KafkaWatermarks {
    fn consumer(&self, topic: &str) -> topicaudit_core::Result<Arc<StreamConsumer>> {
        self.consumer.upgrade().ok_or_else(|| AuditError::Metadata {
            topic: topic.to_string(),
            reason: CONSUMER_CLOSED.to_string(),
        })
    }
}

#[async_trait]
impl WatermarkSource for KafkaWatermarks {
    async fn partitions(
        &self,
        topic: &str,
        timeout: Duration,
    ) -> topicaudit_core::Result<Vec<i32>> {
        let consumer = self.consumer(topic)?;
        let name = topic.to_string();

        tokio::task::spawn_blocking(move || partition_ids(&consumer, &name, timeout))
            .await
            .map_err(|e| AuditError::Metadata {
                topic: topic.to_string(),
                reason: e.to_string(),
            })?
    }

    async fn high_watermark(
        &self,
        topic: &str,
        partition: i32,
        timeout: Duration,
    ) -> topicaudit_core::Result<i64> {
        let consumer = self.consumer(topic)?;
        let name = topic.to_string();

        let (_low, high) = tokio::task::spawn_blocking(move || {
            consumer.fetch_watermarks(&name, partition, timeout)
        })
        .await
        .map_err(|e| AuditError::Watermark {
            partition,
            reason: e.to_string(),
        })?
        .map_err(|e| AuditError::Watermark {
            partition,
            reason: e.to_string(),
        })?;

        Ok(high)
    }
}

/// Fetch fresh metadata for `topic` and return its partition ids.
fn partition_ids(
    consumer: &StreamConsumer,
    topic: &str,
    timeout: Duration,
) -> topicaudit_core::Result<Vec<i32>> {
    let metadata = consumer
        .fetch_metadata(Some(topic), timeout)
        .map_err(|e| AuditError::Metadata {
            topic: topic.to_string(),
            reason: e.to_string(),
        })?;

    let topic_metadata = metadata
        .topics()
        .iter()
        .find(|t| t.name() == topic)
        .ok_or_else(|| AuditError::TopicNotFound(topic.to_string()))?;

    if let Some(err) = topic_metadata.error() {
        return Err(AuditError::Metadata {
            topic: topic.to_string(),
            reason: format!("{:?}", err),
        });
    }

    Ok(topic_metadata.partitions().iter().map(|p| p.id()).collect())
}
