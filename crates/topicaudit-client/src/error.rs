//! Error types for the topicaudit client adapters.
//!
//! ## Error Categories
//!
//! - **Configuration**: `ConfigError` (bad broker property, bad registry URL)
//! - **Broker**: `KafkaError` (consumer creation, subscription)
//! - **Registry**: `SchemaRegistryError` (HTTP failure, unexpected response)
//!
//! Per-record lookup failures are converted to
//! `topicaudit_core::ResolveError` at the trait boundary and are counted by
//! the scan instead of aborting it.

use thiserror::Error;

/// Convenience type alias for `Result<T, ClientError>`.
pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error reported by the Kafka client.
    #[error("Kafka error: {0}")]
    KafkaError(#[from] rdkafka::error::KafkaError),

    /// Schema registry request failed.
    #[error("Schema registry error: {0}")]
    SchemaRegistryError(String),
}
