//! Lag Reporter - Periodic Lag and Distribution Tables
//!
//! The reporter runs beside the scan loop and, on a fixed interval, prints
//! how far the scan is behind the live log plus how traffic is distributed
//! across classifications.
//!
//! ## How It Works
//!
//! 1. Every `interval` (10 seconds by default), take a stats snapshot
//! 2. Skip the tick if nothing was processed yet
//! 3. Fetch the topic's partitions fresh (partitions may be added mid-scan)
//! 4. Fetch each partition's high watermark
//! 5. Render the lag table and the distribution table to the output
//!
//! A metadata or watermark failure ends the reporter with an error; there is
//! no retry. The reporter only reads the stats through snapshots and never
//! blocks the scan loop.
//!
//! ## Example
//!
//! ```ignore
//! let reporter = LagReporter::new(
//!     ReporterConfig::new("orders"),
//!     Arc::clone(&stats),
//!     watermarks,
//!     Box::new(std::io::stdout()),
//! );
//! let handle = tokio::spawn(reporter.run());
//! ```

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::error::Result;
use crate::report::{compute_lag, render_distribution_table, render_lag_table, LagReport};
use crate::source::WatermarkSource;
use crate::stats::StatsAccumulator;

/// Default time between reports
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(10);

/// Default timeout for metadata and watermark queries
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the lag reporter.
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    /// Topic being scanned
    pub topic: String,
    /// Time between reports
    pub interval: Duration,
    /// Timeout for each metadata / watermark query
    pub query_timeout: Duration,
}

impl ReporterConfig {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            interval: DEFAULT_REPORT_INTERVAL,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Background task printing lag and distribution tables.
pub struct LagReporter<W> {
    config: ReporterConfig,
    stats: Arc<StatsAccumulator>,
    watermarks: W,
    out: Box<dyn Write + Send>,
}

impl<W: WatermarkSource> LagReporter<W> {
    pub fn new(
        config: ReporterConfig,
        stats: Arc<StatsAccumulator>,
        watermarks: W,
        out: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            config,
            stats,
            watermarks,
            out,
        }
    }

    /// Run the reporting loop until a tick fails or the task is aborted.
    pub async fn run(mut self) -> Result<()> {
        info!(
            topic = %self.config.topic,
            interval_seconds = self.config.interval.as_secs(),
            "Lag reporter started"
        );

        let start = tokio::time::Instant::now() + self.config.interval;
        let mut ticker = tokio::time::interval_at(start, self.config.interval);

        loop {
            ticker.tick().await;

            if let Err(e) = self.tick().await {
                error!(topic = %self.config.topic, error = %e, "Lag report failed");
                return Err(e);
            }
        }
    }

    /// Produce one report. Returns `None` when nothing was processed yet.
    pub async fn tick(&mut self) -> Result<Option<LagReport>> {
        let snapshot = self.stats.snapshot().await;
        if snapshot.total == 0 {
            debug!(topic = %self.config.topic, "No records processed yet, skipping report");
            return Ok(None);
        }

        let topic = &self.config.topic;
        let timeout = self.config.query_timeout;

        let partitions = self.watermarks.partitions(topic, timeout).await?;
        let mut high_watermarks = Vec::with_capacity(partitions.len());
        for partition in partitions {
            let high = self
                .watermarks
                .high_watermark(topic, partition, timeout)
                .await?;
            high_watermarks.push((partition, high));
        }

        let report = compute_lag(&high_watermarks, &snapshot);

        writeln!(self.out)?;
        writeln!(self.out, "{}", render_lag_table(&report))?;
        writeln!(self.out)?;
        writeln!(self.out, "{}", render_distribution_table(&snapshot))?;
        self.out.flush()?;

        debug!(
            topic = %self.config.topic,
            total = snapshot.total,
            total_lag = report.total_lag,
            "Report rendered"
        );

        Ok(Some(report))
    }
}
