//! Schema Registry Wire Framing
//!
//! Producers that use a schema registry prefix every value with a five byte
//! header:
//!
//! ```text
//! [magic_byte(1) = 0x00][schema_id(4), big-endian][data(N)]
//! ```
//!
//! This module only looks at that header. It never decodes `data`.

/// Magic byte indicating a schema id follows
pub const MAGIC_BYTE: u8 = 0x00;

/// `{`, the first byte of an unframed JSON document
pub const JSON_MAGIC: u8 = 0x7b;

/// Size of the schema id that follows the magic byte
pub const SCHEMA_ID_SIZE: usize = 4;

/// Bytes needed for a complete registry header
pub const HEADER_SIZE: usize = 1 + SCHEMA_ID_SIZE;

/// What the leading bytes of a payload say about its encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Zero-length payload
    Empty,

    /// Registry framed with a complete header
    Registry { schema_id: u32 },

    /// Starts with the magic byte but the schema id is cut short
    TruncatedRegistry { len: usize },

    /// Looks like raw JSON text that skipped registry framing
    RawJson,

    /// Anything else
    Unknown { magic: u8 },
}

/// Inspect the framing header of a payload
pub fn inspect_framing(payload: &[u8]) -> Framing {
    match payload.first() {
        None => Framing::Empty,
        Some(&MAGIC_BYTE) => {
            if payload.len() < HEADER_SIZE {
                return Framing::TruncatedRegistry { len: payload.len() };
            }
            let mut id_bytes = [0u8; SCHEMA_ID_SIZE];
            id_bytes.copy_from_slice(&payload[1..HEADER_SIZE]);
            Framing::Registry {
                schema_id: u32::from_be_bytes(id_bytes),
            }
        }
        Some(&JSON_MAGIC) => Framing::RawJson,
        Some(&magic) => Framing::Unknown { magic },
    }
}
