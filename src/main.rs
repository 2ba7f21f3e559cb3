use clap::Parser;
use pairfile::cli::{Cli, report_error, run_cli};
use pairfile::logging::setup_logging;
use pairfile::output::OutputFormatter;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(cli.verbose) {
        OutputFormatter::warning(&format!("Logging disabled: {e}"));
    }

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };

    match run_cli(cli.command, &root, cli.config.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_cancellation() => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}
