//! Glue between the command line and the pipeline.

use anyhow::{Context, Result};

use crate::cli::Cli;
use crate::config::Config;
use crate::error::ExitCode;
use crate::logging::init_logging;
use crate::pipeline::{Pipeline, RunError};
use crate::progress::Progress;
use crate::signal::install_handler;

/// Run the application for parsed command-line arguments.
///
/// Prints the final summary to stdout (unless `--quiet`) and returns the
/// exit code the process should end with. A stop request is not an error:
/// the partial summary is printed and [`ExitCode::Interrupted`] returned.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the Ctrl+C handler
/// cannot be installed, or the run fails before completing.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    init_logging(cli.verbose, cli.quiet);

    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    let pipeline_config = config.to_pipeline_config();
    log::debug!("Pipeline configuration: {:?}", pipeline_config);

    if pipeline_config.deletion_mode.is_permanent() && !pipeline_config.dry_run {
        log::warn!("Permanent deletion enabled, removed files cannot be recovered");
    }

    let stop = install_handler()?;
    let progress = Progress::new(cli.quiet);
    let pipeline = Pipeline::new(pipeline_config);

    match pipeline.run(&cli.path, &progress, &stop) {
        Ok(summary) => {
            if !cli.quiet {
                println!("\n{summary}");
            }
            Ok(ExitCode::for_summary(&summary))
        }
        Err(RunError::Cancelled { summary }) => {
            if !cli.quiet {
                println!("\n{summary}");
            }
            Ok(ExitCode::Interrupted)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to process {}", cli.path.display())),
    }
}
