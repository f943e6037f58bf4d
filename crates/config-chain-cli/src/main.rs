//! Config Chain CLI
//!
//! See the library documentation for usage and exit codes.

use clap::Parser;
use config_chain_cli::{run, Cli, ExitCode};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8, json: bool) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    // stdout carries the resolved value only
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    let exit_code = match run(&cli.command).await {
        Ok(outcome) => {
            if let Some(output) = outcome.output {
                println!("{}", output);
            }
            if let Some(diagnostic) = outcome.diagnostic {
                eprintln!("{}", diagnostic);
            }
            outcome.code
        }
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::Error
        }
    };

    std::process::exit(exit_code.into());
}
