//! topicaudit client adapters
//!
//! Connects the collaborator traits of `topicaudit-core` to real systems:
//!
//! - [`kafka`]: `rdkafka` consumer used as record source and watermark source
//! - [`registry`]: HTTP schema registry client (Confluent-compatible REST API)
//! - [`cache`]: in-memory cache in front of any schema type resolver
//!
//! ## Example
//!
//! ```ignore
//! use topicaudit_client::{CachingResolver, KafkaAuditConsumer, RegistryClient, RegistryConfig};
//!
//! let consumer = KafkaAuditConsumer::connect(&properties, "orders")?;
//! let registry = RegistryClient::new(RegistryConfig::new("http://localhost:8081"))?;
//! let resolver = CachingResolver::new(registry);
//!
//! let (source, watermarks) = consumer.into_parts();
//! ```

pub mod cache;
pub mod error;
pub mod kafka;
pub mod registry;

pub use cache::CachingResolver;
pub use error::{ClientError, Result};
pub use kafka::{KafkaAuditConsumer, KafkaRecordSource, KafkaWatermarks};
pub use registry::{RegistryClient, RegistryConfig};
