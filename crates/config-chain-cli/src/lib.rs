//! Config Chain CLI
//!
//! Resolves one configuration key through a chain of sources given on the
//! command line, in the order given.
//!
//! ## Usage
//!
//! ```bash
//! # Environment first, then a properties file, then a secret
//! config-chain get db.password \
//!     --source env \
//!     --source properties=app.properties \
//!     --source secrets-manager=app/prod@eu-west-1
//!
//! # Fail unless the key is found
//! config-chain get api.token --source env --require
//!
//! # Show the chain that would be consulted
//! config-chain sources --source system --source env
//! ```
//!
//! ## Exit Codes
//!
//! - 0: Value (or default) printed
//! - 1: Key not found
//! - 2: Invalid arguments or a source could not be set up

use clap::{Args, Parser, Subcommand};
use config_chain_core::providers::{
    ConfigurationSource, ConfigurationSourceExt, EnvSource, MapSource, PropertiesSource,
    SecretsManagerSource, SystemPropertiesSource,
};
use config_chain_core::{ConfigError, Configuration};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Config Chain CLI
#[derive(Parser, Debug)]
#[command(name = "config-chain")]
#[command(about = "Resolve configuration keys through an ordered chain of sources", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a key and print its value
    Get {
        /// The key to resolve
        key: String,

        #[command(flatten)]
        chain: ChainArgs,

        /// Value printed when the key is absent
        #[arg(short, long)]
        default: Option<String>,

        /// Fail when the key is absent
        #[arg(long, conflicts_with = "default")]
        require: bool,
    },

    /// List the sources of the chain, highest precedence first
    Sources {
        #[command(flatten)]
        chain: ChainArgs,
    },
}

/// Sources making up the chain
#[derive(Args, Debug, Clone)]
pub struct ChainArgs {
    /// Source to consult, in order: env, system, properties=PATH,
    /// secrets-manager=SECRET@REGION, value=KEY=VALUE
    ///
    /// Repeat the flag for each source; values may contain commas. Without
    /// any flag, CONFIG_CHAIN_SOURCE supplies a single source, and failing
    /// that the chain is `env` followed by `system`.
    #[arg(short, long = "source", value_name = "SPEC", env = "CONFIG_CHAIN_SOURCE")]
    pub sources: Vec<SourceSpec>,
}

impl ChainArgs {
    /// The requested sources, or the default chain when none were given
    pub fn specs(&self) -> Vec<SourceSpec> {
        if self.sources.is_empty() {
            vec![SourceSpec::Env, SourceSpec::System]
        } else {
            self.sources.clone()
        }
    }

    /// Build the configuration described by these arguments
    pub fn build(&self) -> Result<Configuration, ConfigError> {
        let sources = self
            .specs()
            .iter()
            .map(SourceSpec::build)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Configuration::of(sources))
    }
}

/// One source given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    Env,
    System,
    Properties(PathBuf),
    SecretsManager { secret_id: String, region: String },
    Value { key: String, value: String },
}

/// Errors parsing a source spec
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SpecError {
    #[error("unknown source kind '{0}' (expected env, system, properties, secrets-manager or value)")]
    UnknownKind(String),

    #[error("source '{0}' requires an argument")]
    MissingArgument(String),

    #[error("invalid argument for {kind}: {reason}")]
    InvalidArgument { kind: String, reason: String },
}

impl FromStr for SourceSpec {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, arg) = match s.split_once('=') {
            Some((kind, arg)) => (kind.trim(), Some(arg)),
            None => (s.trim(), None),
        };

        match (kind, arg) {
            ("env", None) => Ok(SourceSpec::Env),
            ("system", None) => Ok(SourceSpec::System),
            ("env" | "system", Some(_)) => Err(SpecError::InvalidArgument {
                kind: kind.to_string(),
                reason: "takes no argument".to_string(),
            }),
            ("properties", Some(path)) if !path.is_empty() => Ok(SourceSpec::Properties(PathBuf::from(path))),
            ("secrets-manager", Some(arg)) if !arg.is_empty() => {
                let (secret_id, region) = arg.rsplit_once('@').ok_or_else(|| SpecError::InvalidArgument {
                    kind: kind.to_string(),
                    reason: "expected SECRET@REGION".to_string(),
                })?;
                if secret_id.is_empty() || region.is_empty() {
                    return Err(SpecError::InvalidArgument {
                        kind: kind.to_string(),
                        reason: "expected SECRET@REGION".to_string(),
                    });
                }
                Ok(SourceSpec::SecretsManager {
                    secret_id: secret_id.to_string(),
                    region: region.to_string(),
                })
            }
            ("value", Some(arg)) if !arg.is_empty() => {
                let (key, value) = arg.split_once('=').ok_or_else(|| SpecError::InvalidArgument {
                    kind: kind.to_string(),
                    reason: "expected KEY=VALUE".to_string(),
                })?;
                Ok(SourceSpec::Value {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            }
            ("properties" | "secrets-manager" | "value", _) => Err(SpecError::MissingArgument(kind.to_string())),
            (other, _) => Err(SpecError::UnknownKind(other.to_string())),
        }
    }
}

impl SourceSpec {
    /// Construct the source this spec describes
    pub fn build(&self) -> Result<Arc<dyn ConfigurationSource>, ConfigError> {
        let source = match self {
            SourceSpec::Env => EnvSource::new().shared(),
            SourceSpec::System => SystemPropertiesSource::new().shared(),
            SourceSpec::Properties(path) => PropertiesSource::from_file(path)?.shared(),
            SourceSpec::SecretsManager { secret_id, region } => {
                SecretsManagerSource::from_env(secret_id.as_str(), region.as_str())?.shared()
            }
            SourceSpec::Value { key, value } => {
                MapSource::from_pairs([(key.as_str(), value.as_str())]).shared()
            }
        };
        Ok(source)
    }
}

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    NotFound,
    Error,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        match code {
            ExitCode::Success => 0,
            ExitCode::NotFound => 1,
            ExitCode::Error => 2,
        }
    }
}

/// Result of running a command
///
/// `output` goes to stdout and `diagnostic` to stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub output: Option<String>,
    pub diagnostic: Option<String>,
    pub code: ExitCode,
}

impl Outcome {
    fn success(output: String) -> Self {
        Self {
            output: Some(output),
            diagnostic: None,
            code: ExitCode::Success,
        }
    }

    fn not_found(diagnostic: Option<String>) -> Self {
        Self {
            output: None,
            diagnostic,
            code: ExitCode::NotFound,
        }
    }
}

/// Execute a parsed command
pub async fn run(command: &Commands) -> anyhow::Result<Outcome> {
    match command {
        Commands::Get {
            key,
            chain,
            default,
            require,
        } => {
            let config = chain.build()?;
            tracing::debug!(key = %key, sources = ?config.source_names(), "Resolving key");

            if *require {
                return match config.require(key).await {
                    Ok(value) => Ok(Outcome::success(value)),
                    Err(e @ ConfigError::Missing { .. }) => Ok(Outcome::not_found(Some(e.to_string()))),
                    Err(e) => Err(e.into()),
                };
            }

            let value = match default {
                Some(default) => Some(config.get_or(key, default.as_str()).await),
                None => config.get(key).await,
            };

            Ok(match value {
                Some(value) => Outcome::success(value),
                None => Outcome::not_found(None),
            })
        }
        Commands::Sources { chain } => {
            let config = chain.build()?;
            Ok(Outcome::success(config.source_names().join("\n")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_source_specs() {
        assert_eq!("env".parse::<SourceSpec>(), Ok(SourceSpec::Env));
        assert_eq!("system".parse::<SourceSpec>(), Ok(SourceSpec::System));
        assert_eq!(
            "properties=conf/app.properties".parse::<SourceSpec>(),
            Ok(SourceSpec::Properties(PathBuf::from("conf/app.properties")))
        );
        assert_eq!(
            "secrets-manager=team@app/prod@eu-west-1".parse::<SourceSpec>(),
            Ok(SourceSpec::SecretsManager {
                secret_id: "team@app/prod".to_string(),
                region: "eu-west-1".to_string(),
            })
        );
        assert_eq!(
            "value=url=http://x?a=b".parse::<SourceSpec>(),
            Ok(SourceSpec::Value {
                key: "url".to_string(),
                value: "http://x?a=b".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_source_spec_errors() {
        assert_eq!(
            "vault".parse::<SourceSpec>(),
            Err(SpecError::UnknownKind("vault".to_string()))
        );
        assert_eq!(
            "properties".parse::<SourceSpec>(),
            Err(SpecError::MissingArgument("properties".to_string()))
        );
        assert!(matches!(
            "secrets-manager=no-region".parse::<SourceSpec>(),
            Err(SpecError::InvalidArgument { .. })
        ));
        assert!(matches!(
            "env=x".parse::<SourceSpec>(),
            Err(SpecError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_cli_parsing_keeps_source_order() {
        let cli = Cli::parse_from([
            "config-chain",
            "get",
            "db.user",
            "--source",
            "value=db.user=first",
            "-s",
            "env",
            "--default",
            "nobody",
        ]);

        match cli.command {
            Commands::Get { key, chain, default, require } => {
                assert_eq!(key, "db.user");
                assert_eq!(chain.sources.len(), 2);
                assert!(matches!(chain.sources[0], SourceSpec::Value { .. }));
                assert_eq!(chain.sources[1], SourceSpec::Env);
                assert_eq!(default.as_deref(), Some("nobody"));
                assert!(!require);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_require_conflicts_with_default() {
        let result = Cli::try_parse_from(["config-chain", "get", "k", "--require", "--default", "d"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_chain() {
        let chain = ChainArgs { sources: Vec::new() };
        assert_eq!(chain.specs(), vec![SourceSpec::Env, SourceSpec::System]);
    }

    #[tokio::test]
    async fn test_run_get_first_source_wins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "greeting=from-file").unwrap();

        let command = Commands::Get {
            key: "greeting".to_string(),
            chain: ChainArgs {
                sources: vec![
                    SourceSpec::Properties(file.path().to_path_buf()),
                    SourceSpec::Value {
                        key: "greeting".to_string(),
                        value: "from-value".to_string(),
                    },
                ],
            },
            default: None,
            require: false,
        };

        let outcome = run(&command).await.unwrap();
        assert_eq!(outcome.output.as_deref(), Some("from-file"));
        assert_eq!(outcome.code, ExitCode::Success);
    }

    #[tokio::test]
    async fn test_run_get_missing_and_default() {
        let chain = ChainArgs {
            sources: vec![SourceSpec::Value {
                key: "a".to_string(),
                value: "1".to_string(),
            }],
        };

        let missing = Commands::Get {
            key: "b".to_string(),
            chain: chain.clone(),
            default: None,
            require: false,
        };
        let outcome = run(&missing).await.unwrap();
        assert_eq!(outcome.output, None);
        assert_eq!(outcome.code, ExitCode::NotFound);

        let defaulted = Commands::Get {
            key: "b".to_string(),
            chain: chain.clone(),
            default: Some("fallback".to_string()),
            require: false,
        };
        let outcome = run(&defaulted).await.unwrap();
        assert_eq!(outcome.output.as_deref(), Some("fallback"));

        let required = Commands::Get {
            key: "b".to_string(),
            chain,
            default: None,
            require: true,
        };
        let outcome = run(&required).await.unwrap();
        assert_eq!(outcome.code, ExitCode::NotFound);
        assert_eq!(outcome.output, None);
        assert_eq!(outcome.diagnostic.as_deref(), Some("b not found in configuration"));
    }

    #[tokio::test]
    async fn test_run_require_present_value() {
        let command = Commands::Get {
            key: "a".to_string(),
            chain: ChainArgs {
                sources: vec![SourceSpec::Value {
                    key: "a".to_string(),
                    value: "1".to_string(),
                }],
            },
            default: None,
            require: true,
        };

        let outcome = run(&command).await.unwrap();
        assert_eq!(outcome.output.as_deref(), Some("1"));
        assert_eq!(outcome.code, ExitCode::Success);
    }

    #[test]
    fn test_source_values_may_contain_commas() {
        let cli = Cli::parse_from([
            "config-chain",
            "sources",
            "--source",
            "value=hosts=a,b,c",
            "--source",
            "env",
        ]);

        match cli.command {
            Commands::Sources { chain } => {
                assert_eq!(
                    chain.sources,
                    vec![
                        SourceSpec::Value {
                            key: "hosts".to_string(),
                            value: "a,b,c".to_string(),
                        },
                        SourceSpec::Env,
                    ]
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_missing_properties_file_is_setup_error() {
        let dir = tempfile::tempdir().unwrap();
        let command = Commands::Sources {
            chain: ChainArgs {
                sources: vec![SourceSpec::Properties(dir.path().join("nope.properties"))],
            },
        };

        let err = run(&command).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::PropertiesIo { .. })
        ));
    }

    #[tokio::test]
    async fn test_run_sources_lists_chain() {
        let command = Commands::Sources {
            chain: ChainArgs {
                sources: vec![SourceSpec::System, SourceSpec::Env],
            },
        };

        let outcome = run(&command).await.unwrap();
        assert_eq!(outcome.output.as_deref(), Some("system\nenv"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(i32::from(ExitCode::Success), 0);
        assert_eq!(i32::from(ExitCode::NotFound), 1);
        assert_eq!(i32::from(ExitCode::Error), 2);
    }
}
