//! HTTP client for a Schema Registry
//!
//! Resolves schema ids to their schema type using the Confluent-compatible
//! `GET /schemas/ids/{id}` endpoint. Registries omit `schemaType` for Avro
//! schemas, so the type is returned as an `Option`.
//!
//! Basic authentication is used when both a username and a password are
//! configured.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use topicaudit_core::{ResolveError, SchemaTypeResolver};

use crate::error::{ClientError, Result};

/// Default HTTP timeout for registry requests
pub const DEFAULT_REGISTRY_TIMEOUT: Duration = Duration::from_secs(10);

/// Schema registry connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Base URL (e.g., "http://localhost:8081")
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl RegistryConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
            timeout: DEFAULT_REGISTRY_TIMEOUT,
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Credentials, only when both parts are present
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some((username.as_str(), password.as_str())),
            _ => None,
        }
    }
}

/// Body of `GET /schemas/ids/{id}`
#[derive(Debug, Deserialize)]
struct SchemaByIdResponse {
    #[serde(rename = "schemaType", default)]
    schema_type: Option<String>,
}

/// HTTP client for schema id lookups
pub struct RegistryClient {
    base_url: String,
    credentials: Option<(String, String)>,
    http_client: reqwest::Client,
}

impl RegistryClient {
    /// Create a new Schema Registry client
    pub fn new(config: RegistryConfig) -> Result<Self> {
        let base_url = config.url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::ConfigError(
                "schema registry url must not be empty".to_string(),
            ));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::ConfigError(format!(
                "schema registry url must start with http:// or https://: {}",
                base_url
            )));
        }

        let credentials = config
            .credentials()
            .map(|(user, pass)| (user.to_string(), pass.to_string()));
        if credentials.is_some() {
            info!("Using schema registry authentication");
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ClientError::ConfigError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            base_url,
            credentials,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn uses_authentication(&self) -> bool {
        self.credentials.is_some()
    }

    fn schema_url(&self, id: u32) -> String {
        format!("{}/schemas/ids/{}", self.base_url, id)
    }

    /// Get the schema type for a schema id
    ///
    /// # Returns
    /// `None` for Avro (no `schemaType` in the response), otherwise the tag
    pub async fn get_schema_type(&self, id: u32) -> Result<Option<String>> {
        let mut request = self.http_client.get(self.schema_url(id));
        if let Some((username, password)) = &self.credentials {
            request = request.basic_auth(username, Some(password));
        }

        let response = request.send().await.map_err(|e| {
            ClientError::SchemaRegistryError(format!("Failed to fetch schema {}: {}", id, e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::SchemaRegistryError(format!(
                "Schema {} lookup failed with status {}: {}",
                id, status, body
            )));
        }

        let schema: SchemaByIdResponse = response.json().await.map_err(|e| {
            ClientError::SchemaRegistryError(format!(
                "Failed to parse schema {} response: {}",
                id, e
            ))
        })?;

        debug!(
            schema_id = id,
            schema_type = schema.schema_type.as_deref().unwrap_or("AVRO"),
            "Schema retrieved"
        );

        Ok(schema.schema_type)
    }
}

#[async_trait]
impl SchemaTypeResolver for RegistryClient {
    async fn lookup(&self, schema_id: u32) -> std::result::Result<Option<String>, ResolveError> {
        self.get_schema_type(schema_id)
            .await
            .map_err(|e| ResolveError::new(e.to_string()))
    }
}
