//! Report rendering
//!
//! Builds the two tables printed on every reporting tick:
//!
//! - consumer lag per partition (`Partition | Latest | Position | Lag`)
//! - classification distribution (`Type | Count | %`)
//!
//! Lag math lives in [`compute_lag`] and is independent of the broker, so
//! it can be checked without a cluster.

use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
    Table,
};

use crate::classification::ClassificationTag;
use crate::stats::StatsSnapshot;

/// Lag of a single partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionLag {
    pub partition: i32,
    pub high_watermark: i64,
    pub position: i64,
    pub lag: i64,
}

/// Lag across all partitions of the scanned topic
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LagReport {
    pub partitions: Vec<PartitionLag>,
    pub total_lag: i64,
}

/// Compare high watermarks against the last positions seen by the scan.
///
/// Partitions the scan has not reached yet count from position 0.
pub fn compute_lag(high_watermarks: &[(i32, i64)], snapshot: &StatsSnapshot) -> LagReport {
    let mut report = LagReport::default();

    for &(partition, high_watermark) in high_watermarks {
        let position = snapshot.position(partition);
        let lag = high_watermark - position;
        report.total_lag += lag;
        report.partitions.push(PartitionLag {
            partition,
            high_watermark,
            position,
            lag,
        });
    }

    report
}

/// Render the lag table with a `Messages behind` footer.
pub fn render_lag_table(report: &LagReport) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Partition", "Latest", "Position", "Lag"]);
    for row in &report.partitions {
        builder.push_record([
            row.partition.to_string(),
            row.high_watermark.to_string(),
            row.position.to_string(),
            row.lag.to_string(),
        ]);
    }
    builder.push_record([
        "Messages behind".to_string(),
        report.total_lag.to_string(),
        String::new(),
        String::new(),
    ]);

    styled(builder.build())
}

/// Render the classification distribution with a `Total` footer.
pub fn render_distribution_table(snapshot: &StatsSnapshot) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Type", "Count", "%"]);
    for tag in ClassificationTag::ALL {
        builder.push_record([
            tag.label().to_string(),
            snapshot.count(tag).to_string(),
            snapshot.percentage(tag),
        ]);
    }
    builder.push_record(["Total".to_string(), snapshot.total.to_string(), String::new()]);

    styled(builder.build())
}

fn styled(mut table: Table) -> String {
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn snapshot_with_positions(positions: &[(i32, i64)]) -> StatsSnapshot {
        StatsSnapshot {
            total: 5,
            positions: positions.iter().copied().collect::<BTreeMap<_, _>>(),
            ..Default::default()
        }
    }

    #[test]
    fn test_lag_single_partition() {
        let snapshot = snapshot_with_positions(&[(0, 4)]);
        let report = compute_lag(&[(0, 10)], &snapshot);

        assert_eq!(
            report.partitions,
            vec![PartitionLag {
                partition: 0,
                high_watermark: 10,
                position: 4,
                lag: 6,
            }]
        );
        assert_eq!(report.total_lag, 6);
    }

    #[test]
    fn test_lag_unseen_partition_counts_from_zero() {
        let snapshot = snapshot_with_positions(&[(0, 4)]);
        let report = compute_lag(&[(0, 10), (1, 25)], &snapshot);

        assert_eq!(report.partitions[1].position, 0);
        assert_eq!(report.partitions[1].lag, 25);
        assert_eq!(report.total_lag, 31);
    }

    #[test]
    fn test_lag_no_partitions() {
        let report = compute_lag(&[], &StatsSnapshot::default());
        assert!(report.partitions.is_empty());
        assert_eq!(report.total_lag, 0);
    }

    #[test]
    fn test_render_lag_table() {
        let snapshot = snapshot_with_positions(&[(0, 4), (1, 7)]);
        let report = compute_lag(&[(0, 10), (1, 9)], &snapshot);
        let rendered = render_lag_table(&report);

        assert!(rendered.contains("Partition"));
        assert!(rendered.contains("Latest"));
        assert!(rendered.contains("Position"));
        assert!(rendered.contains("Lag"));
        assert!(rendered.contains("Messages behind"));
        let footer = rendered
            .lines()
            .find(|line| line.contains("Messages behind"))
            .unwrap();
        assert!(footer.contains(" 8 "));
    }

    #[test]
    fn test_render_distribution_table() {
        let mut snapshot = StatsSnapshot {
            total: 4,
            ..Default::default()
        };
        snapshot.counts[ClassificationTag::Avro.index()] = 3;
        snapshot.counts[ClassificationTag::EmptyPayload.index()] = 1;

        let rendered = render_distribution_table(&snapshot);

        for tag in ClassificationTag::ALL {
            assert!(rendered.contains(tag.label()), "missing {}", tag.label());
        }
        assert!(rendered.contains("75.00000"));
        assert!(rendered.contains("25.00000"));
        let footer = rendered.lines().find(|line| line.contains("Total")).unwrap();
        assert!(footer.contains(" 4 "));
    }

    #[test]
    fn test_render_distribution_without_data() {
        let rendered = render_distribution_table(&StatsSnapshot::default());
        let avro = rendered.lines().find(|line| line.contains("AVRO")).unwrap();
        assert!(avro.contains(" - "));
    }
}
