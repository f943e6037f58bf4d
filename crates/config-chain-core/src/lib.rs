//! Config Chain Core
//!
//! Resolves configuration keys against an ordered chain of sources and
//! returns the first value found.
//!
//! ## Features
//!
//! - **Uniform Lookup**: Every source implements one async `get(key)` contract
//! - **Ordered Fallback**: Earlier sources win; later sources are only consulted on a miss
//! - **Lazy Remote Secrets**: AWS Secrets Manager bundles are fetched once, on first use
//! - **Graceful Degradation**: Remote failures and malformed secrets read as "not found"
//! - **Fail-Fast Files**: Missing properties files are reported at construction
//!
//! ## Example
//!
//! ```rust,ignore
//! use config_chain_core::Configuration;
//! use config_chain_core::providers::{
//!     ConfigurationSourceExt, EnvSource, PropertiesSource, SecretsManagerSource,
//! };
//!
//! let config = Configuration::of([
//!     EnvSource::new().shared(),
//!     PropertiesSource::from_file("app.properties")?.shared(),
//!     SecretsManagerSource::from_env("app/prod", "eu-west-1")?.shared(),
//! ]);
//!
//! let user = config.require("db.user").await?;
//! let pool = config.get_or("db.pool_size", "10").await;
//! ```

pub mod configuration;
pub mod error;
pub mod providers;

pub use configuration::Configuration;
pub use error::{ConfigError, ConfigResult};
pub use providers::{ConfigurationSource, ConfigurationSourceExt};
