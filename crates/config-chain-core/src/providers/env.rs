//! Environment Variable Source
//!
//! Reads configuration from the process environment. Keys are upper-cased
//! before lookup, so `database_url` and `DATABASE_URL` both resolve to the
//! `DATABASE_URL` variable. No other translation is applied: dots and
//! dashes are kept as-is.

use super::traits::ConfigurationSource;

/// Source for process environment variables
///
/// Read-only; reflects the environment at query time.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl EnvSource {
    /// Create a new environment source
    pub fn new() -> Self {
        Self
    }

    /// The variable name consulted for `key`
    pub fn variable_name(key: &str) -> String {
        key.to_uppercase()
    }
}

#[async_trait::async_trait]
impl ConfigurationSource for EnvSource {
    fn name(&self) -> &str {
        "env"
    }

    async fn get(&self, key: &str) -> Option<String> {
        let var_name = Self::variable_name(key);

        match std::env::var(&var_name) {
            Ok(value) => Some(value),
            Err(std::env::VarError::NotPresent) => None,
            Err(std::env::VarError::NotUnicode(_)) => {
                tracing::debug!(variable = %var_name, "Ignoring environment variable with invalid UTF-8");
                None
            }
        }
    }
}
