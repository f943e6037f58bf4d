//! System Properties Source
//!
//! A process-wide, mutable property table. Any part of the program can set
//! a property at runtime (for example from command-line flags) and every
//! [`SystemPropertiesSource`] sees it immediately. Keys are matched exactly.
//!
//! The table starts out with a few properties describing the host:
//! `os.name`, `os.arch`, `file.separator`, `path.separator`,
//! `line.separator` and `user.dir`.

use super::traits::ConfigurationSource;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

static PROPERTIES: Lazy<RwLock<HashMap<String, String>>> =
    Lazy::new(|| RwLock::new(host_properties()));

fn host_properties() -> HashMap<String, String> {
    let mut properties = HashMap::new();
    properties.insert("os.name".to_string(), std::env::consts::OS.to_string());
    properties.insert("os.arch".to_string(), std::env::consts::ARCH.to_string());
    properties.insert(
        "file.separator".to_string(),
        std::path::MAIN_SEPARATOR.to_string(),
    );
    properties.insert(
        "path.separator".to_string(),
        if cfg!(windows) { ";" } else { ":" }.to_string(),
    );
    properties.insert(
        "line.separator".to_string(),
        if cfg!(windows) { "\r\n" } else { "\n" }.to_string(),
    );
    if let Ok(dir) = std::env::current_dir() {
        properties.insert("user.dir".to_string(), dir.display().to_string());
    }
    properties
}

/// Set a system property, returning the previous value
pub fn set_property(key: impl Into<String>, value: impl Into<String>) -> Option<String> {
    PROPERTIES
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(key.into(), value.into())
}

/// Remove a system property, returning its value
pub fn clear_property(key: &str) -> Option<String> {
    PROPERTIES
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(key)
}

/// Read a system property
pub fn property(key: &str) -> Option<String> {
    PROPERTIES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(key)
        .cloned()
}

/// Source for the process-wide system property table
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPropertiesSource;

impl SystemPropertiesSource {
    /// Create a new system properties source
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ConfigurationSource for SystemPropertiesSource {
    fn name(&self) -> &str {
        "system"
    }

    async fn get(&self, key: &str) -> Option<String> {
        property(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_properties_seeded() {
        assert_eq!(property("os.name"), Some(std::env::consts::OS.to_string()));
        assert_eq!(property("os.arch"), Some(std::env::consts::ARCH.to_string()));
        assert!(property("file.separator").is_some());
    }

    #[test]
    fn test_set_and_clear() {
        assert_eq!(set_property("config.chain.test.set", "one"), None);
        assert_eq!(set_property("config.chain.test.set", "two"), Some("one".to_string()));
        assert_eq!(property("config.chain.test.set"), Some("two".to_string()));
        assert_eq!(clear_property("config.chain.test.set"), Some("two".to_string()));
        assert_eq!(property("config.chain.test.set"), None);
    }

    #[tokio::test]
    async fn test_source_sees_runtime_changes() {
        let source = SystemPropertiesSource::new();
        assert_eq!(source.get("config.chain.test.runtime").await, None);

        set_property("config.chain.test.runtime", "now");
        assert_eq!(source.get("config.chain.test.runtime").await, Some("now".to_string()));

        clear_property("config.chain.test.runtime");
        assert_eq!(source.get("config.chain.test.runtime").await, None);
    }

    #[tokio::test]
    async fn test_exact_key_match() {
        set_property("config.chain.test.Case", "v");

        let source = SystemPropertiesSource::new();
        assert_eq!(source.get("config.chain.test.case").await, None);
        assert_eq!(source.get("config.chain.test.Case").await, Some("v".to_string()));

        clear_property("config.chain.test.Case");
    }
}
