//! Configuration Sources
//!
//! This module provides the lookup contract shared by every configuration
//! source, the fallback combinator that chains them, and the built-in
//! source implementations.
//!
//! # Supported Sources
//!
//! - **Maps**: In-memory key/value pairs
//! - **Properties Files**: Flat `key=value` files, loaded eagerly
//! - **Environment Variables**: Process environment, keys upper-cased
//! - **System Properties**: A process-wide mutable property table
//! - **AWS Secrets Manager**: One JSON secret, fetched lazily and cached
//!
//! # Architecture
//!
//! All sources implement the `ConfigurationSource` trait. Chains are built by
//! composing sources pairwise with `Fallback`; the first source to answer
//! wins and later sources are not consulted.
//!
//! # Example
//!
//! ```rust,ignore
//! use config_chain_core::providers::{
//!     combine_all, ConfigurationSourceExt, EnvSource, PropertiesSource, SecretsManagerSource,
//! };
//!
//! let chain = combine_all([
//!     EnvSource::new().shared(),
//!     PropertiesSource::from_file("app.properties")?.shared(),
//!     SecretsManagerSource::from_env("app/prod", "eu-west-1")?.shared(),
//! ]);
//!
//! let value = chain.get("database.password").await;
//! ```

pub mod traits;
pub mod chain;
pub mod map;
pub mod properties;
pub mod env;
pub mod system;
pub mod secrets_manager;
pub mod cloud;

// Re-export core types
pub use traits::{from_fn, ConfigurationSource, ConfigurationSourceExt, FindNothing, FnSource};
pub use chain::{combine, combine_all, Fallback};

// Re-export source implementations
pub use map::MapSource;
pub use properties::PropertiesSource;
pub use env::EnvSource;
pub use system::{clear_property, property, set_property, SystemPropertiesSource};
pub use secrets_manager::{SecretStoreClient, SecretsManagerSource, StoreError};
pub use cloud::{AwsSecretsManagerClient, SecretsManagerConfig};
