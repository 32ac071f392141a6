//! Configuration file loading for topicaudit
//!
//! The config file is a librdkafka-style properties file:
//!
//! ```text
//! # Kafka
//! bootstrap.servers = broker-1:9092
//! group.id = topicaudit
//!
//! # Schema registry
//! schema.registry.url = https://registry:8081
//! schema.registry.username = alice
//! schema.registry.password = secret
//! ```
//!
//! Keys starting with `schema.registry` configure the registry client; every
//! other key goes to the Kafka client untouched.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::warn;

use topicaudit_client::RegistryConfig;

pub const CONFIG_SR: &str = "schema.registry";
pub const CONFIG_SR_URL: &str = "schema.registry.url";
pub const CONFIG_SR_USERNAME: &str = "schema.registry.username";
pub const CONFIG_SR_PASSWORD: &str = "schema.registry.password";

#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Properties passed to the Kafka client
    pub kafka: BTreeMap<String, String>,

    /// Schema registry settings
    pub registry: RegistryConfig,
}

impl AuditConfig {
    /// Read and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("cannot open: {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid config file: {}", path.display()))
    }

    /// Parse `key = value` lines, skipping blanks and `#` comments
    pub fn parse(contents: &str) -> Result<Self> {
        let mut kafka = BTreeMap::new();
        let mut registry = BTreeMap::new();

        for (number, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                bail!("invalid line {}: {}", number + 1, line);
            };
            let key = key.trim();
            let value = value.trim();
            if key.is_empty() {
                bail!("invalid line {}: missing key", number + 1);
            }

            if key.starts_with(CONFIG_SR) {
                registry.insert(key.to_string(), value.to_string());
            } else {
                kafka.insert(key.to_string(), value.to_string());
            }
        }

        let registry = registry_config(registry)?;
        Ok(Self { kafka, registry })
    }
}

fn registry_config(mut values: BTreeMap<String, String>) -> Result<RegistryConfig> {
    let url = values
        .remove(CONFIG_SR_URL)
        .filter(|url| !url.is_empty())
        .with_context(|| format!("missing required '{}'", CONFIG_SR_URL))?;

    let mut config = RegistryConfig::new(url);
    config.username = values.remove(CONFIG_SR_USERNAME);
    config.password = values.remove(CONFIG_SR_PASSWORD);

    if config.username.is_some() != config.password.is_some() {
        warn!(
            "Only one of {} and {} is set, schema registry authentication disabled",
            CONFIG_SR_USERNAME, CONFIG_SR_PASSWORD
        );
    }
    for key in values.keys() {
        warn!(key = %key, "Ignoring unknown schema registry setting");
    }

    Ok(config)
}
