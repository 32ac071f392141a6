//! Running Classification Statistics
//!
//! The scan loop records every classified record here; the lag reporter
//! reads consistent snapshots concurrently.
//!
//! ## What is tracked
//!
//! - `total`: records classified so far
//! - one counter per [`ClassificationTag`]
//! - `positions`: last offset seen per partition
//!
//! `total` and the matching tag counter are bumped under the same write
//! lock, so every snapshot satisfies `total == sum(counts)`.
//!
//! ## Usage
//!
//! ```ignore
//! let stats = Arc::new(StatsAccumulator::new());
//!
//! // scan loop (single writer)
//! stats.record(ClassificationTag::Avro, 0, 1042).await;
//!
//! // reporter (reader)
//! let snapshot = stats.snapshot().await;
//! println!("{} records, {}% Avro", snapshot.total, snapshot.percentage(ClassificationTag::Avro));
//! ```

use std::collections::BTreeMap;

use tokio::sync::RwLock;

use crate::classification::ClassificationTag;

/// Shown instead of a percentage before anything was processed.
pub const NO_DATA: &str = "-";

const TAG_COUNT: usize = ClassificationTag::ALL.len();

#[derive(Debug, Default)]
struct Counters {
    total: u64,
    counts: [u64; TAG_COUNT],
    positions: BTreeMap<i32, i64>,
}

/// Point-in-time copy of the statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Records classified
    pub total: u64,
    /// Count per tag, indexed by [`ClassificationTag::index`]
    pub counts: [u64; TAG_COUNT],
    /// Last offset seen per partition
    pub positions: BTreeMap<i32, i64>,
}

impl StatsSnapshot {
    pub fn count(&self, tag: ClassificationTag) -> u64 {
        self.counts[tag.index()]
    }

    /// Last offset seen on `partition`, 0 if nothing was seen yet
    pub fn position(&self, partition: i32) -> i64 {
        self.positions.get(&partition).copied().unwrap_or(0)
    }

    pub fn percentage(&self, tag: ClassificationTag) -> String {
        format_percentage(self.count(tag), self.total)
    }
}

/// Format `count / total` as a percentage with 5 decimals.
///
/// Returns [`NO_DATA`] when `total` is zero.
pub fn format_percentage(count: u64, total: u64) -> String {
    if total == 0 {
        return NO_DATA.to_string();
    }
    let percentage = (count as f64 / total as f64) * 100.0;
    format!("{:.5}", percentage)
}

/// Process-wide classification counters and partition positions.
#[derive(Debug, Default)]
pub struct StatsAccumulator {
    inner: RwLock<Counters>,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one classified record and remember its position.
    ///
    /// # Arguments
    ///
    /// * `tag` - Classification outcome of the record
    /// * `partition` - Partition the record came from
    /// * `offset` - Offset of the record
    pub async fn record(&self, tag: ClassificationTag, partition: i32, offset: i64) {
        let mut inner = self.inner.write().await;
        inner.total += 1;
        inner.counts[tag.index()] += 1;
        inner.positions.insert(partition, offset);
    }

    pub async fn total(&self) -> u64 {
        self.inner.read().await.total
    }

    pub async fn count(&self, tag: ClassificationTag) -> u64 {
        self.inner.read().await.counts[tag.index()]
    }

    /// Last offset seen on `partition`, if any
    pub async fn position(&self, partition: i32) -> Option<i64> {
        self.inner.read().await.positions.get(&partition).copied()
    }

    /// Share of `tag` among all records, or [`NO_DATA`] before the first one.
    pub async fn percentage(&self, tag: ClassificationTag) -> String {
        let inner = self.inner.read().await;
        format_percentage(inner.counts[tag.index()], inner.total)
    }

    /// Consistent copy of all counters and positions.
    pub async fn snapshot(&self) -> StatsSnapshot {
        let inner = self.inner.read().await;
        StatsSnapshot {
            total: inner.total,
            counts: inner.counts,
            positions: inner.positions.clone(),
        }
    }
}
