//! AWS Secrets Manager Client
//!
//! A [`SecretStoreClient`] backed by the AWS SDK. Credentials and endpoint
//! overrides are resolved through the SDK's default provider chain, so
//! environment keys, shared profiles, SSO, and ECS or EC2 instance roles all
//! work unchanged.
//!
//! # Configuration
//!
//! [`SecretsManagerConfig::from_env`] reads:
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `CONFIG_CHAIN_SECRETS_TIMEOUT_MS` | Operation timeout (default 30s) |
//!
//! Everything else (`AWS_PROFILE`, `AWS_ACCESS_KEY_ID`,
//! `AWS_ENDPOINT_URL_SECRETS_MANAGER`, ...) is read by the SDK itself.
//!
//! Retries are disabled: a failed request is reported once and the secret
//! source degrades to an empty bundle.
//!
//! # Example
//!
//! ```rust,ignore
//! use config_chain_core::providers::{AwsSecretsManagerClient, SecretsManagerConfig};
//!
//! let client = AwsSecretsManagerClient::new(SecretsManagerConfig::from_env())?;
//! let payload = client.get_secret_value("app/prod", "eu-west-1").await?;
//! ```

use super::secrets_manager::{SecretStoreClient, StoreError};
use crate::error::{ConfigError, ConfigResult};
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_secretsmanager::config::Credentials;
use aws_sdk_secretsmanager::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_secretsmanager::operation::get_secret_value::GetSecretValueError;
use aws_sdk_secretsmanager::Client;
use std::fmt;
use std::time::Duration;

const SERVICE: &str = "secrets_manager";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the Secrets Manager client
#[derive(Debug, Clone)]
pub struct SecretsManagerConfig {
    /// Endpoint override; the SDK's regional endpoint is used otherwise
    pub endpoint: Option<String>,
    /// Static credentials; the SDK's default chain is used otherwise
    pub credentials: Option<Credentials>,
    /// Operation timeout
    pub timeout: Duration,
}

impl Default for SecretsManagerConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SecretsManagerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let timeout = match std::env::var("CONFIG_CHAIN_SECRETS_TIMEOUT_MS") {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => {
                    tracing::warn!(value = %raw, "Ignoring invalid CONFIG_CHAIN_SECRETS_TIMEOUT_MS");
                    DEFAULT_TIMEOUT
                }
            },
            Err(_) => DEFAULT_TIMEOUT,
        };

        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Set the endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the credentials
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set static access keys, with an optional session token
    pub fn with_static_credentials(
        self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        self.with_credentials(Credentials::new(
            access_key_id,
            secret_access_key,
            session_token,
            None,
            "config-chain",
        ))
    }

    /// Set the operation timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Secrets Manager client over the AWS SDK
pub struct AwsSecretsManagerClient {
    config: SecretsManagerConfig,
}

impl AwsSecretsManagerClient {
    /// Create a client with the given configuration
    ///
    /// Fails when the endpoint override is not an http(s) URL.
    pub fn new(config: SecretsManagerConfig) -> ConfigResult<Self> {
        if let Some(endpoint) = &config.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(ConfigError::setup(
                    SERVICE,
                    format!("endpoint must be an http(s) URL, got {}", endpoint),
                ));
            }
        }

        Ok(Self { config })
    }

    /// The client's configuration
    pub fn config(&self) -> &SecretsManagerConfig {
        &self.config
    }

    async fn sdk_client(&self, region: &str) -> Client {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(self.config.timeout)
                    .build(),
            );

        if let Some(endpoint) = &self.config.endpoint {
            loader = loader.endpoint_url(endpoint.as_str());
        }
        if let Some(credentials) = &self.config.credentials {
            loader = loader.credentials_provider(credentials.clone());
        }

        Client::new(&loader.load().await)
    }
}

impl fmt::Debug for AwsSecretsManagerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsSecretsManagerClient")
            .field("config", &self.config)
            .finish()
    }
}

fn map_sdk_error<R: fmt::Debug>(err: SdkError<GetSecretValueError, R>) -> StoreError {
    match err {
        SdkError::ServiceError(service) => {
            let err = service.err();
            let message = err.message().unwrap_or_default().to_string();
            if err.is_resource_not_found_exception() {
                return StoreError::NotFound(message);
            }
            StoreError::Service {
                code: err.code().unwrap_or("Unknown").to_string(),
                message,
            }
        }
        SdkError::TimeoutError(_) => StoreError::Timeout(DisplayErrorContext(&err).to_string()),
        SdkError::DispatchFailure(ref failure) if failure.is_timeout() => {
            StoreError::Timeout(DisplayErrorContext(&err).to_string())
        }
        other => StoreError::Transport(DisplayErrorContext(&other).to_string()),
    }
}

#[async_trait::async_trait]
impl SecretStoreClient for AwsSecretsManagerClient {
    async fn get_secret_value(&self, secret_id: &str, region: &str) -> Result<Option<String>, StoreError> {
        tracing::debug!(secret = secret_id, region = region, "Requesting secret value");

        let output = self
            .sdk_client(region)
            .await
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(output.secret_string().map(str::to_string))
    }
}
