//! depcoord - resolve module artifacts with coordinated remote access
//!
//! Exit codes:
//! - 0: every requested module resolved
//! - 1: fatal error (bad configuration, unreadable repository, nothing resolved)
//! - 2: some requested modules failed

use clap::Parser;
use depcoord::cli::CliArgs;
use depcoord::error::AppError;
use depcoord::logging;
use depcoord::orchestrator::{Orchestrator, OrchestratorConfig};
use depcoord::output::{create_formatter, OutputConfig};
use depcoord::repository::{InMemoryRepository, ModuleComponentRepository};
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    logging::init(args.verbose);

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Validate options and load the repository descriptor
fn prepare(args: &CliArgs) -> Result<(OrchestratorConfig, Arc<InMemoryRepository>), AppError> {
    let config = OrchestratorConfig::from_cli(args)?;
    let repository = InMemoryRepository::from_file(&args.repository)?;
    Ok((config, Arc::new(repository)))
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let (config, repository) = prepare(&args)?;

    tracing::info!(
        repository = repository.name(),
        modules = repository.module_count(),
        workers = config.workers,
        requested = args.coordinates.len(),
        variant_filter = args.has_variant_filter(),
        "starting resolution"
    );

    let orchestrator = Orchestrator::new(repository.clone(), config);
    let summary = orchestrator
        .run(&args.coordinates)
        .await
        .with_stats(repository.stats());

    let output_config = OutputConfig::from_cli(args.json, args.verbose, args.quiet)
        .with_color(io::stdout().is_terminal());
    let formatter = create_formatter(output_config);

    let mut stdout = io::stdout().lock();
    formatter.format(&summary, &mut stdout)?;
    stdout.flush()?;

    if summary.is_total_failure() {
        Ok(ExitCode::FAILURE)
    } else if summary.has_failures() {
        // Partial success - some requests failed
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
