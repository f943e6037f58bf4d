//! Core lookup contract for configuration sources
//!
//! Every source, from an in-memory map to a remote secret store, implements
//! the single-method [`ConfigurationSource`] capability. Sources are then
//! composed into fallback chains (see [`super::chain`]).

use std::fmt;
use std::sync::Arc;

use super::chain::Fallback;

/// A source of configuration values
///
/// `get` is a query: it returns `None` when the key is not known to this
/// source and never treats absence as an error. Repeated calls with the same
/// key only return different results when the underlying data changes
/// (e.g. the process environment).
///
/// # Example
///
/// ```rust,ignore
/// use config_chain_core::providers::{ConfigurationSource, MapSource};
///
/// let source: MapSource = [("port", "8080")].into_iter().collect();
/// assert_eq!(source.get("port").await, Some("8080".to_string()));
/// assert_eq!(source.get("host").await, None);
/// ```
#[async_trait::async_trait]
pub trait ConfigurationSource: Send + Sync {
    /// Returns a short name of this source for diagnostics
    fn name(&self) -> &str;

    /// Look up a single key
    async fn get(&self, key: &str) -> Option<String>;

    /// Append the names of the leaf sources behind this one, in precedence order
    ///
    /// Composite sources override this to report their members; the empty
    /// source reports nothing.
    fn describe(&self, names: &mut Vec<String>) {
        names.push(self.name().to_string());
    }
}

#[async_trait::async_trait]
impl<S: ConfigurationSource + ?Sized> ConfigurationSource for Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn get(&self, key: &str) -> Option<String> {
        (**self).get(key).await
    }

    fn describe(&self, names: &mut Vec<String>) {
        (**self).describe(names)
    }
}

#[async_trait::async_trait]
impl<S: ConfigurationSource + ?Sized> ConfigurationSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn get(&self, key: &str) -> Option<String> {
        (**self).get(key).await
    }

    fn describe(&self, names: &mut Vec<String>) {
        (**self).describe(names)
    }
}

/// The source that never finds anything
///
/// This is the identity of fallback composition: an empty chain behaves
/// exactly like `FindNothing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FindNothing;

#[async_trait::async_trait]
impl ConfigurationSource for FindNothing {
    fn name(&self) -> &str {
        "nothing"
    }

    async fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn describe(&self, _names: &mut Vec<String>) {}
}

/// A source backed by a plain lookup function
pub struct FnSource<F> {
    name: String,
    lookup: F,
}

impl<F> FnSource<F>
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    /// Wrap `lookup` as a source named `name`
    pub fn new(name: impl Into<String>, lookup: F) -> Self {
        Self {
            name: name.into(),
            lookup,
        }
    }
}

impl<F> fmt::Debug for FnSource<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSource").field("name", &self.name).finish()
    }
}

#[async_trait::async_trait]
impl<F> ConfigurationSource for FnSource<F>
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
    }
}

/// Build a source from a closure
pub fn from_fn<F>(name: impl Into<String>, lookup: F) -> FnSource<F>
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    FnSource::new(name, lookup)
}

/// Combinators available on every sized source
pub trait ConfigurationSourceExt: ConfigurationSource + Sized + 'static {
    /// Fall back to `next` when this source has no value
    fn or<S: ConfigurationSource + 'static>(self, next: S) -> Fallback {
        Fallback::new(Arc::new(self), Arc::new(next))
    }

    /// Erase this source into a shared trait object
    fn shared(self) -> Arc<dyn ConfigurationSource> {
        Arc::new(self)
    }
}

impl<T: ConfigurationSource + Sized + 'static> ConfigurationSourceExt for T {}
