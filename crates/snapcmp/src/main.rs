mod batch;
mod cli;
mod commands;
mod config;
mod report;

use clap::Parser;
use config::{CliOverrides, ResolvedRunConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("snapcmp=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Init { force } => {
            commands::init(force)?;
        }
        cli::Command::Review { open } => {
            commands::review(open)?;
        }
        cli::Command::Compare {
            reference,
            candidate,
            precision,
            output,
            json,
        } => {
            let overrides = CliOverrides {
                precision,
                parallel: None,
            };
            let config = ResolvedRunConfig::new_or_default(overrides)?;
            let code = commands::compare(config, &reference, &candidate, output.as_deref(), json)?;
            std::process::exit(code);
        }
        cli::Command::Test {
            filter,
            precision,
            record,
            parallel,
        } => {
            let overrides = CliOverrides {
                precision,
                parallel,
            };
            let config = ResolvedRunConfig::new(overrides)?;
            let code = commands::test(config, filter.as_deref(), record).await?;
            std::process::exit(code);
        }
        cli::Command::Approve { filter } => {
            commands::approve(filter.as_deref())?;
        }
    }

    Ok(())
}
