//! `adscript` entry point.
//!
//! Composition root: loads `.adscript/config.toml`, installs the tracing
//! subscriber, builds the OpenAI-backed pipelines, and dispatches the
//! selected subcommand. Any failure is reported once on stderr.

use std::process::ExitCode;

use clap::Parser;

use cli::commands::{self, Cli, Command};
use cli::config::AppConfig;
use cli::observability;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        Command::Config => commands::show_config(&config, &mut stdout),
        Command::Generate(args) => {
            let _telemetry = observability::init(&config.observability)?;
            let pipelines = commands::build_pipelines(&config)?;
            commands::generate(args, &pipelines, &mut stdout).await?;
            Ok(())
        }
        Command::Variations { input, output } => {
            let _telemetry = observability::init(&config.observability)?;
            let pipelines = commands::build_pipelines(&config)?;
            commands::variations(input, output.as_deref(), &pipelines, &mut stdout).await?;
            Ok(())
        }
    }
}
