//! Record Data Structure
//!
//! A `Record` is one message pulled from the broker. It only lives for the
//! duration of a single classification call; nothing retains it afterwards.
//!
//! ## Structure
//! - **topic**: Topic the record came from (used in log lines)
//! - **partition**: Partition id within the topic
//! - **offset**: Position within the partition, non-decreasing per partition
//! - **payload**: Raw value bytes, possibly empty
//!
//! Uses `bytes::Bytes` so adapters can hand over the payload without copying
//! it again.

use bytes::Bytes;

/// A single record read from a topic partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Topic name
    pub topic: String,

    /// Partition id
    pub partition: i32,

    /// Offset of this record in the partition
    pub offset: i64,

    /// Value (payload)
    pub payload: Bytes,
}

impl Record {
    pub fn new(topic: impl Into<String>, partition: i32, offset: i64, payload: Bytes) -> Self {
        Self {
            topic: topic.into(),
            partition,
            offset,
            payload,
        }
    }

    /// `topic/partition/offset`, the coordinate format used in log lines
    pub fn coordinates(&self) -> String {
        format!("{}/{}/{}", self.topic, self.partition, self.offset)
    }
}
