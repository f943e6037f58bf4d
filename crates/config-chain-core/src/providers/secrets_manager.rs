//! Remote Secret Source
//!
//! Adapts a single secret held in a remote secret store into a
//! [`ConfigurationSource`]. The secret's payload is expected to be a flat
//! JSON object; each member becomes one configuration key:
//!
//! ```json
//! {"db.user": "app", "db.password": "s3cret"}
//! ```
//!
//! # Fetch Semantics
//!
//! Construction performs no I/O. The first `get` fetches the secret exactly
//! once and caches the parsed bundle for the lifetime of the source; all
//! later lookups, hits or misses, are served from memory without locking.
//! Concurrent first lookups wait on the same fetch instead of issuing their
//! own.
//!
//! # Degradation
//!
//! The store being unreachable, timing out, reporting the secret as missing,
//! or returning a payload that is not a flat object all produce an empty
//! bundle. The source then answers `None` for every key, letting the chain
//! fall through to the next source.

use super::cloud::{AwsSecretsManagerClient, SecretsManagerConfig};
use super::traits::ConfigurationSource;
use crate::error::ConfigResult;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;

/// Failures reported by a secret store client
#[derive(Error, Debug)]
pub enum StoreError {
    /// The secret does not exist
    #[error("Secret not found: {0}")]
    NotFound(String),

    /// The request did not complete in time
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Network or connection error
    #[error("Transport error: {0}")]
    Transport(String),

    /// The store rejected the request
    #[error("Secret store error {code}: {message}")]
    Service {
        code: String,
        message: String,
    },
}

/// Client for a remote secret store
///
/// Returns the secret's string payload, `Ok(None)` if the secret exists but
/// has no string payload (e.g. a binary secret), or a [`StoreError`].
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SecretStoreClient: Send + Sync {
    /// Fetch the payload of `secret_id` in `region`
    async fn get_secret_value(&self, secret_id: &str, region: &str) -> Result<Option<String>, StoreError>;
}

/// Source backed by one secret in a remote secret store
pub struct SecretsManagerSource {
    secret_id: String,
    region: String,
    client: Arc<dyn SecretStoreClient>,
    bundle: OnceCell<HashMap<String, String>>,
}

impl SecretsManagerSource {
    /// Create a source for `secret_id` using the given client
    pub fn new(
        secret_id: impl Into<String>,
        region: impl Into<String>,
        client: Arc<dyn SecretStoreClient>,
    ) -> Self {
        Self {
            secret_id: secret_id.into(),
            region: region.into(),
            client,
            bundle: OnceCell::new(),
        }
    }

    /// Create a source backed by AWS Secrets Manager, configured from the environment
    pub fn from_env(secret_id: impl Into<String>, region: impl Into<String>) -> ConfigResult<Self> {
        let client = AwsSecretsManagerClient::new(SecretsManagerConfig::from_env())?;
        Ok(Self::new(secret_id, region, Arc::new(client)))
    }

    /// The secret this source reads
    pub fn secret_id(&self) -> &str {
        &self.secret_id
    }

    /// The region the secret is fetched from
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Whether the secret has already been fetched
    pub fn is_fetched(&self) -> bool {
        self.bundle.initialized()
    }

    async fn bundle(&self) -> &HashMap<String, String> {
        self.bundle.get_or_init(|| self.fetch_bundle()).await
    }

    async fn fetch_bundle(&self) -> HashMap<String, String> {
        tracing::debug!(secret = %self.secret_id, region = %self.region, "Fetching secret bundle");

        let payload = match self.client.get_secret_value(&self.secret_id, &self.region).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                tracing::debug!(secret = %self.secret_id, "Secret has no string payload");
                return HashMap::new();
            }
            Err(StoreError::NotFound(_)) => {
                tracing::debug!(secret = %self.secret_id, "Secret does not exist");
                return HashMap::new();
            }
            Err(e) => {
                tracing::warn!(secret = %self.secret_id, error = %e, "Failed to fetch secret, treating as empty");
                return HashMap::new();
            }
        };

        match parse_bundle(&payload) {
            Ok(bundle) => {
                tracing::debug!(secret = %self.secret_id, entries = bundle.len(), "Loaded secret bundle");
                bundle
            }
            Err(reason) => {
                tracing::warn!(secret = %self.secret_id, error = %reason, "Secret payload is not a flat JSON object, treating as empty");
                HashMap::new()
            }
        }
    }
}

impl fmt::Debug for SecretsManagerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretsManagerSource")
            .field("secret_id", &self.secret_id)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl ConfigurationSource for SecretsManagerSource {
    fn name(&self) -> &str {
        "secrets_manager"
    }

    async fn get(&self, key: &str) -> Option<String> {
        self.bundle().await.get(key).cloned()
    }
}

/// Parse a secret payload into a flat string map
///
/// Numbers and booleans are converted to their text form and `null` members
/// are skipped. Nested objects or arrays reject the whole payload.
fn parse_bundle(payload: &str) -> Result<HashMap<String, String>, String> {
    let object: serde_json::Map<String, JsonValue> =
        serde_json::from_str(payload).map_err(|e| e.to_string())?;

    let mut bundle = HashMap::with_capacity(object.len());
    for (key, value) in object {
        let value = match value {
            JsonValue::String(s) => s,
            JsonValue::Number(n) => n.to_string(),
            JsonValue::Bool(b) => b.to_string(),
            JsonValue::Null => continue,
            JsonValue::Array(_) | JsonValue::Object(_) => {
                return Err(format!("value of {key} is not a scalar"));
            }
        };
        bundle.insert(key, value);
    }

    Ok(bundle)
}
