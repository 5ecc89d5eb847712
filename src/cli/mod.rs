//! The `fixture-harness` command-line interface.
//!
//! Builds a [`HarnessConfig`] from an optional config file and the command
//! line, registers the cases directory with an in-process [`Suite`], runs it
//! and prints the reports to stderr.
//!
//! Exit codes: `0` when every case passed or was accepted, `1` when any case
//! failed, `2` when the run could not start (bad configuration or discovery
//! failure).

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use termcolor::StandardStream;

use crate::cli::args::HarnessArgs;
use crate::config::HarnessConfig;
use crate::diagnostics::{HarnessError, Result};
use crate::harness::MutationCases;
use crate::mutation::CommandPipeline;
use crate::suite::{RunSummary, Suite};

pub mod args;
pub mod output;

const COMMAND_LINE: &str = "<command line>";

/// The main entry point for the CLI.
pub async fn run() -> ExitCode {
    let args = HarnessArgs::parse();
    let mut stderr = StandardStream::stderr(output::color_choice());

    let parallel = args.parallel;
    let suite = match prepare(args) {
        Ok(suite) => suite,
        Err(error) => {
            let _ = output::print_error(&mut stderr, &error);
            return ExitCode::from(2);
        }
    };

    let reports = suite.run(parallel).await;
    let _ = output::print_reports(&mut stderr, &reports);

    if RunSummary::from_reports(&reports).has_failures() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

fn prepare(args: HarnessArgs) -> Result<Suite> {
    let config = build_config(args)?;
    let cases = config
        .cases
        .clone()
        .ok_or_else(|| HarnessError::config(COMMAND_LINE, "no cases directory given"))?;
    let pipeline = CommandPipeline::from_argv(&config.command).ok_or_else(|| {
        HarnessError::config(COMMAND_LINE, "no mutation command given (pass it after `--`)")
    })?;

    tracing::debug!(cases = %cases.display(), program = pipeline.program(), "starting run");
    let mut suite = Suite::default();
    MutationCases::new(Arc::new(pipeline), config.template()?)
        .with_label(config.label())
        .describe(&cases, &mut suite)?;
    Ok(suite)
}

/// Loads `--config` when given, then overlays every option set on the
/// command line.
pub fn build_config(args: HarnessArgs) -> Result<HarnessConfig> {
    let mut config = match &args.config {
        Some(path) => HarnessConfig::load(path)?,
        None => HarnessConfig::default(),
    };

    overlay(&mut config.cases, args.cases);
    overlay(&mut config.label, args.label);
    overlay(&mut config.original, args.original);
    overlay(&mut config.actual, args.actual);
    overlay(&mut config.expected, args.expected);
    overlay(&mut config.settings, args.settings);
    overlay(&mut config.normalize_endlines, args.normalize_endlines);
    overlay(&mut config.waves, args.waves);
    config.accept |= args.accept;
    if !args.includes.is_empty() {
        config.includes = args.includes;
    }
    if !args.command.is_empty() {
        config.command = args.command;
    }
    Ok(config)
}

fn overlay<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}
