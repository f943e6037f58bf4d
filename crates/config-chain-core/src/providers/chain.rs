//! Fallback Composition
//!
//! This module combines configuration sources into a priority-ordered
//! chain. When fetching a value, sources are consulted in order until one
//! answers; later sources are never touched once an earlier one has.
//!
//! # Example
//!
//! ```rust,ignore
//! use config_chain_core::providers::{combine_all, EnvSource, MapSource, ConfigurationSourceExt};
//!
//! // Environment variables take priority over built-in defaults
//! let chain = combine_all([
//!     EnvSource::new().shared(),
//!     MapSource::from_pairs([("port", "8080")]).shared(),
//! ]);
//!
//! let port = chain.get("port").await;
//! ```

use super::traits::{ConfigurationSource, FindNothing};
use std::fmt;
use std::sync::Arc;

/// Two sources composed with first-match-wins semantics
///
/// `secondary` is only consulted when `primary` reports absence. Callers rely
/// on this: a source placed after one that answers receives no call at all.
#[derive(Clone)]
pub struct Fallback {
    primary: Arc<dyn ConfigurationSource>,
    secondary: Arc<dyn ConfigurationSource>,
}

impl Fallback {
    /// Compose `primary` with `secondary` as its fallback
    pub fn new(
        primary: Arc<dyn ConfigurationSource>,
        secondary: Arc<dyn ConfigurationSource>,
    ) -> Self {
        Self { primary, secondary }
    }

    /// The source consulted first
    pub fn primary(&self) -> &Arc<dyn ConfigurationSource> {
        &self.primary
    }

    /// The source consulted when the primary has no value
    pub fn secondary(&self) -> &Arc<dyn ConfigurationSource> {
        &self.secondary
    }
}

impl fmt::Debug for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        self.describe(&mut names);
        f.debug_struct("Fallback").field("sources", &names).finish()
    }
}

#[async_trait::async_trait]
impl ConfigurationSource for Fallback {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.primary.get(key).await {
            tracing::trace!(source = self.primary.name(), key = key, "Resolved configuration key");
            return Some(value);
        }

        let value = self.secondary.get(key).await;
        if value.is_some() {
            tracing::trace!(source = self.secondary.name(), key = key, "Resolved configuration key");
        }
        value
    }

    fn describe(&self, names: &mut Vec<String>) {
        self.primary.describe(names);
        self.secondary.describe(names);
    }
}

/// Combine two sources; `primary` wins on key collision
pub fn combine(
    primary: Arc<dyn ConfigurationSource>,
    secondary: Arc<dyn ConfigurationSource>,
) -> Arc<dyn ConfigurationSource> {
    Arc::new(Fallback::new(primary, secondary))
}

/// Combine any number of sources in declared order
///
/// Earlier sources take precedence. The result resolves keys the same way
/// as any nesting of [`combine`] over the same order; an empty input yields
/// [`FindNothing`].
pub fn combine_all<I>(sources: I) -> Arc<dyn ConfigurationSource>
where
    I: IntoIterator<Item = Arc<dyn ConfigurationSource>>,
{
    sources
        .into_iter()
        .fold(Arc::new(FindNothing) as Arc<dyn ConfigurationSource>, combine)
}
