//! topicaudit CLI
//!
//! Scans a Kafka topic from the consumer group's position and classifies how
//! every record is framed: schema registry framed Avro, JSON Schema or
//! Protobuf, raw JSON, or an anomaly.
//!
//! ## Usage
//!
//! ```bash
//! # Audit everything, anomalies land in ./interesting.csv
//! topicaudit detail client.properties orders
//!
//! # Only Protobuf is expected, everything else is logged
//! topicaudit --want PROTOBUF detail client.properties orders
//! ```
//!
//! ## Configuration
//!
//! The config file is a `key = value` properties file. `schema.registry.*`
//! keys configure the schema registry client, every other key is handed to
//! librdkafka. See [`config`] for the format.
//!
//! Environment variables:
//! - `RUST_LOG`: Log level (default: info), logs go to stderr
//! - `TOPICAUDIT_ANOMALY_FILE`: Anomaly CSV path (default: interesting.csv)
//!
//! ## Output
//!
//! Every `--report-interval-secs` seconds a lag table and a classification
//! distribution table are printed to stdout. Anomalous records are appended
//! to the anomaly CSV as `partition,offset,reason` rows.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use topicaudit_client::{CachingResolver, KafkaAuditConsumer, RegistryClient};
use topicaudit_core::anomaly::DEFAULT_ANOMALY_FILE;
use topicaudit_core::report::render_distribution_table;
use topicaudit_core::{
    AnomalyLog, Classifier, CsvAnomalySink, LagReporter, ReporterConfig, ScanLoop,
    StatsAccumulator, WantedEncoding,
};

mod config;
mod progress;

use config::AuditConfig;
use progress::SpinnerProgress;

#[derive(Parser)]
#[command(name = "topicaudit")]
#[command(about = "Audit the serialization framing of records on a Kafka topic", long_about = None)]
#[command(version)]
struct Cli {
    /// Log messages that are not the desired type: AVRO, PROTOBUF, JSONSCHEMA
    #[arg(long, global = true, value_parser = parse_wanted)]
    want: Option<WantedEncoding>,

    /// CSV file anomalous records are appended to
    #[arg(
        long,
        global = true,
        env = "TOPICAUDIT_ANOMALY_FILE",
        default_value = DEFAULT_ANOMALY_FILE
    )]
    anomaly_file: PathBuf,

    /// Seconds between lag reports
    #[arg(
        long,
        global = true,
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    report_interval_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a topic and report the type of every message
    Detail {
        /// librdkafka / schema registry properties file
        file: PathBuf,
        /// Topic to scan
        topic: String,
    },
}

fn parse_wanted(value: &str) -> std::result::Result<WantedEncoding, String> {
    value.parse().map_err(|e: topicaudit_core::AuditError| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .parse()
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Some(wanted) = cli.want {
        info!(wanted = %wanted, "Filtering for wanted encoding");
    }

    match &cli.command {
        Commands::Detail { file, topic } => detail(&cli, file, topic).await,
    }
}

async fn detail(cli: &Cli, file: &Path, topic: &str) -> Result<()> {
    let config = AuditConfig::load(file)?;

    let sink = CsvAnomalySink::open(&cli.anomaly_file)
        .with_context(|| format!("cannot open: {}", cli.anomaly_file.display()))?;

    let registry = RegistryClient::new(config.registry.clone())
        .context("error connecting to schema registry")?;
    let consumer = KafkaAuditConsumer::connect(&config.kafka, topic)
        .context("error creating consumer")?;

    let (source, watermarks) = consumer.into_parts();
    let stats = Arc::new(StatsAccumulator::new());

    let reporter = LagReporter::new(
        ReporterConfig::new(topic).with_interval(Duration::from_secs(cli.report_interval_secs)),
        Arc::clone(&stats),
        watermarks,
        Box::new(std::io::stdout()),
    );
    let mut reporter_handle = tokio::spawn(reporter.run());

    let scan = ScanLoop::new(
        source,
        Classifier::new(CachingResolver::new(registry)),
        Arc::clone(&stats),
        AnomalyLog::new(Box::new(sink)),
    )
    .with_wanted(cli.want)
    .with_progress(Box::new(SpinnerProgress::new()));

    info!(topic = topic, "Reading topic");

    let scan_task = scan.run();
    tokio::pin!(scan_task);

    let summary = tokio::select! {
        summary = &mut scan_task => summary,
        reported = &mut reporter_handle => {
            let err = match reported {
                Ok(Err(e)) => anyhow::Error::new(e),
                Ok(Ok(())) => anyhow!("lag reporter stopped unexpectedly"),
                Err(e) => anyhow::Error::new(e),
            };
            return Err(err.context("lag reporting failed"));
        }
    };

    reporter_handle.abort();

    let snapshot = stats.snapshot().await;
    if snapshot.total > 0 {
        println!("{}", render_distribution_table(&snapshot));
    }

    info!(
        topic = topic,
        processed = summary.processed,
        anomalies = summary.anomalies,
        reason = %summary.stop_reason,
        "Scan stopped"
    );

    Ok(())
}
