//! Classification Outcomes
//!
//! Every record ends up in exactly one [`Classification`]. The three
//! registry-backed success kinds (Avro, JSON Schema, Protobuf) are the
//! "healthy" outcomes; everything else is a data-quality anomaly and is
//! routed to the anomaly log.
//!
//! [`ClassificationTag`] is the fieldless counterpart used as a counter key
//! and for the distribution table.

use std::fmt;
use std::str::FromStr;

use crate::error::AuditError;

/// Outcome of classifying one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Registry framed, schema type unset (Avro implied)
    Avro,

    /// Registry framed, schema type `JSON`
    JsonSchema,

    /// Registry framed, schema type `PROTOBUF`
    Protobuf,

    /// Registry framed, schema type present but not one we know
    UnsupportedSchemaType { schema_id: u32, schema_type: String },

    /// Registry framed, but the schema id could not be resolved
    SchemaLookupError { schema_id: u32, cause: String },

    /// Zero-length payload
    EmptyPayload,

    /// First byte is `{`: raw JSON that skipped registry framing
    InvalidFramingJson,

    /// First byte is neither the magic byte nor `{`
    InvalidFramingOther,

    /// Magic byte present but fewer than 5 bytes in total
    TruncatedFraming { len: usize },
}

/// Fieldless tag for each [`Classification`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClassificationTag {
    Avro,
    JsonSchema,
    Protobuf,
    InvalidFramingJson,
    InvalidFramingOther,
    EmptyPayload,
    SchemaLookupError,
    UnsupportedSchemaType,
    TruncatedFraming,
}

impl ClassificationTag {
    /// All tags, in distribution table order
    pub const ALL: [ClassificationTag; 9] = [
        ClassificationTag::Avro,
        ClassificationTag::JsonSchema,
        ClassificationTag::Protobuf,
        ClassificationTag::InvalidFramingJson,
        ClassificationTag::InvalidFramingOther,
        ClassificationTag::EmptyPayload,
        ClassificationTag::SchemaLookupError,
        ClassificationTag::UnsupportedSchemaType,
        ClassificationTag::TruncatedFraming,
    ];

    /// Position of this tag in [`ClassificationTag::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Label shown in the distribution table
    pub fn label(self) -> &'static str {
        match self {
            ClassificationTag::Avro => "AVRO",
            ClassificationTag::JsonSchema => "JSON schema",
            ClassificationTag::Protobuf => "Protobuf",
            ClassificationTag::InvalidFramingJson => "Invalid Magic Byte (JSON)",
            ClassificationTag::InvalidFramingOther => "Invalid Magic Byte",
            ClassificationTag::EmptyPayload => "Empty",
            ClassificationTag::SchemaLookupError => "Schema Error",
            ClassificationTag::UnsupportedSchemaType => "Unsupported Schema",
            ClassificationTag::TruncatedFraming => "Truncated Framing",
        }
    }
}

impl Classification {
    pub fn tag(&self) -> ClassificationTag {
        match self {
            Classification::Avro => ClassificationTag::Avro,
            Classification::JsonSchema => ClassificationTag::JsonSchema,
            Classification::Protobuf => ClassificationTag::Protobuf,
            Classification::UnsupportedSchemaType { .. } => ClassificationTag::UnsupportedSchemaType,
            Classification::SchemaLookupError { .. } => ClassificationTag::SchemaLookupError,
            Classification::EmptyPayload => ClassificationTag::EmptyPayload,
            Classification::InvalidFramingJson => ClassificationTag::InvalidFramingJson,
            Classification::InvalidFramingOther => ClassificationTag::InvalidFramingOther,
            Classification::TruncatedFraming { .. } => ClassificationTag::TruncatedFraming,
        }
    }

    /// The encoding for the three registry-backed success outcomes
    pub fn encoding(&self) -> Option<WantedEncoding> {
        match self {
            Classification::Avro => Some(WantedEncoding::Avro),
            Classification::JsonSchema => Some(WantedEncoding::JsonSchema),
            Classification::Protobuf => Some(WantedEncoding::Protobuf),
            _ => None,
        }
    }

    /// Reason to log this record as an anomaly, if it is one.
    ///
    /// Success outcomes are anomalous only when a wanted encoding is set and
    /// differs. Every other outcome is anomalous regardless of the filter.
    pub fn anomaly_reason(&self, wanted: Option<WantedEncoding>) -> Option<String> {
        match self {
            Classification::Avro | Classification::JsonSchema | Classification::Protobuf => {
                let encoding = self.encoding()?;
                match wanted {
                    Some(want) if want != encoding => Some(format!("Unwanted {}", encoding)),
                    _ => None,
                }
            }
            Classification::EmptyPayload => Some("empty message".to_string()),
            Classification::InvalidFramingJson => Some("invalid magic byte (JSON)".to_string()),
            Classification::InvalidFramingOther => Some("invalid magic byte".to_string()),
            Classification::SchemaLookupError { schema_id, .. } => {
                Some(format!("Error reading schema: {}", schema_id))
            }
            Classification::UnsupportedSchemaType {
                schema_id,
                schema_type,
            } => Some(format!(
                "Unsupported schema type: {} (schema {})",
                schema_type, schema_id
            )),
            Classification::TruncatedFraming { len } => Some(format!(
                "truncated schema registry framing ({} bytes)",
                len
            )),
        }
    }
}

/// Encoding an operator expects every record on the topic to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WantedEncoding {
    Avro,
    JsonSchema,
    Protobuf,
}

impl WantedEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            WantedEncoding::Avro => "AVRO",
            WantedEncoding::JsonSchema => "JSONSCHEMA",
            WantedEncoding::Protobuf => "PROTOBUF",
        }
    }
}

impl fmt::Display for WantedEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WantedEncoding {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AVRO" => Ok(WantedEncoding::Avro),
            "JSONSCHEMA" => Ok(WantedEncoding::JsonSchema),
            "PROTOBUF" => Ok(WantedEncoding::Protobuf),
            _ => Err(AuditError::InvalidWantedEncoding(s.to_string())),
        }
    }
}
