//! Record Classifier
//!
//! Maps one record to a [`Classification`] by looking at its first byte and,
//! for registry-framed payloads, asking the schema registry which encoding
//! the embedded schema id uses.
//!
//! ## Dispatch order
//!
//! 1. Empty payload → `EmptyPayload` (registry never consulted)
//! 2. Magic byte `0x00`
//!    - fewer than 5 bytes → `TruncatedFraming` (registry never consulted)
//!    - lookup fails → `SchemaLookupError`
//!    - no (or empty) schema type → `Avro`
//!    - `JSON` → `JsonSchema`, `PROTOBUF` → `Protobuf`
//!    - anything else → `UnsupportedSchemaType`
//! 3. `{` → `InvalidFramingJson`
//! 4. Anything else → `InvalidFramingOther`
//!
//! Lookups are never retried. A slow registry stalls the caller, so wrap the
//! resolver in a cache when scanning large topics.

use tracing::debug;

use crate::classification::Classification;
use crate::framing::{inspect_framing, Framing};
use crate::record::Record;
use crate::source::SchemaTypeResolver;

/// Schema type tag registries use for JSON Schema
pub const SCHEMA_TYPE_JSON: &str = "JSON";

/// Schema type tag registries use for Protobuf
pub const SCHEMA_TYPE_PROTOBUF: &str = "PROTOBUF";

/// Classifies records using a schema type resolver
pub struct Classifier<R> {
    resolver: R,
}

impl<R: SchemaTypeResolver> Classifier<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// Classify a single record
    pub async fn classify(&self, record: &Record) -> Classification {
        match inspect_framing(&record.payload) {
            Framing::Empty => Classification::EmptyPayload,
            Framing::TruncatedRegistry { len } => Classification::TruncatedFraming { len },
            Framing::Registry { schema_id } => self.classify_registry(schema_id).await,
            Framing::RawJson => Classification::InvalidFramingJson,
            Framing::Unknown { .. } => Classification::InvalidFramingOther,
        }
    }

    async fn classify_registry(&self, schema_id: u32) -> Classification {
        let schema_type = match self.resolver.lookup(schema_id).await {
            Ok(schema_type) => schema_type,
            Err(e) => {
                debug!(schema_id, error = %e, "Schema lookup failed");
                return Classification::SchemaLookupError {
                    schema_id,
                    cause: e.to_string(),
                };
            }
        };

        match schema_type.as_deref() {
            None | Some("") => Classification::Avro,
            Some(SCHEMA_TYPE_JSON) => Classification::JsonSchema,
            Some(SCHEMA_TYPE_PROTOBUF) => Classification::Protobuf,
            Some(other) => Classification::UnsupportedSchemaType {
                schema_id,
                schema_type: other.to_string(),
            },
        }
    }
}
