//! In-memory map source

use super::traits::ConfigurationSource;
use std::collections::HashMap;

/// Source backed by an in-memory map
///
/// Useful for defaults and overrides built at startup, and in tests.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    values: HashMap<String, String>,
}

impl MapSource {
    /// Create a source from an existing map
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Create a source from key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs.into_iter().collect()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the map has no entries
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<HashMap<String, String>> for MapSource {
    fn from(values: HashMap<String, String>) -> Self {
        Self::new(values)
    }
}

#[async_trait::async_trait]
impl ConfigurationSource for MapSource {
    fn name(&self) -> &str {
        "map"
    }

    async fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
