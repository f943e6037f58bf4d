//! Configuration facade
//!
//! [`Configuration`] is the object application code talks to. It wraps one
//! composed source and adds the conveniences callers need: optional lookup,
//! lookup with a default, and required lookup that fails when nothing in
//! the chain has the key.

use crate::error::{ConfigError, ConfigResult};
use crate::providers::{combine, combine_all, ConfigurationSource, FindNothing};
use std::fmt;
use std::sync::Arc;

/// Resolves keys against an ordered chain of sources
///
/// Cloning is cheap and clones share the same sources. [`Configuration::or`]
/// returns a new facade and leaves the receiver untouched.
///
/// # Example
///
/// ```rust,ignore
/// use config_chain_core::{Configuration, providers::{ConfigurationSourceExt, EnvSource, MapSource}};
///
/// let config = Configuration::of([
///     EnvSource::new().shared(),
///     MapSource::from_pairs([("port", "8080")]).shared(),
/// ]);
///
/// let port = config.get_or("port", "80").await;
/// let url = config.require("database_url").await?;
/// ```
#[derive(Clone)]
pub struct Configuration {
    source: Arc<dyn ConfigurationSource>,
}

impl Configuration {
    /// A configuration that finds nothing
    pub fn new() -> Self {
        Self::from_shared(Arc::new(FindNothing))
    }

    /// A configuration backed by a single source
    pub fn from_source<S: ConfigurationSource + 'static>(source: S) -> Self {
        Self::from_shared(Arc::new(source))
    }

    /// A configuration backed by an already shared source
    pub fn from_shared(source: Arc<dyn ConfigurationSource>) -> Self {
        Self { source }
    }

    /// A configuration consulting `sources` in the given order
    pub fn of<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn ConfigurationSource>>,
    {
        Self::from_shared(combine_all(sources))
    }

    /// Look up `key`
    pub async fn get(&self, key: &str) -> Option<String> {
        self.source.get(key).await
    }

    /// Look up `key`, falling back to `default` when absent
    pub async fn get_or(&self, key: &str, default: impl Into<String>) -> String {
        match self.get(key).await {
            Some(value) => value,
            None => default.into(),
        }
    }

    /// Look up `key`, failing with [`ConfigError::Missing`] when absent
    pub async fn require(&self, key: &str) -> ConfigResult<String> {
        self.get(key).await.ok_or_else(|| {
            tracing::debug!(key = key, sources = ?self.source_names(), "Required configuration key not found");
            ConfigError::missing(key)
        })
    }

    /// A new configuration that falls back to `next` after this one
    pub fn or<S: ConfigurationSource + 'static>(&self, next: S) -> Self {
        Self::from_shared(combine(Arc::clone(&self.source), Arc::new(next)))
    }

    /// The composed source behind this configuration
    pub fn source(&self) -> &Arc<dyn ConfigurationSource> {
        &self.source
    }

    /// Names of the underlying sources, highest precedence first
    pub fn source_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.source.describe(&mut names);
        names
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("sources", &self.source_names())
            .finish()
    }
}
