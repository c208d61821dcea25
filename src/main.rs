mod cli_args;
mod config;
mod error;
mod llm;
mod logging;
mod setup;

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::process::ExitCode;
use std::time::Duration;

use crate::cli_args::Cli;
use crate::config::Config;

fn main() -> ExitCode {
    // Usage errors exit with status 2 from inside clap.
    let cli = Cli::parse();

    let verbosity = config::verbosity();
    logging::init_logger(verbosity);

    match run(&cli, verbosity) {
        Ok(commit_message) => {
            println!("{commit_message}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, verbosity: u8) -> Result<String> {
    // Credential and settings are checked before any transport exists.
    let cfg = Config::from_sources()?;
    let transport = setup::build_transport(&cfg)?;

    let spinner = waiting_spinner(verbosity);
    let result =
        llm::generate_commit_message(&cli.prompt, cfg.max_chars, &cfg.request, &transport);
    spinner.finish_and_clear();

    Ok(result?)
}

/// Spinner on stderr while the request is in flight; hidden when not a TTY.
fn waiting_spinner(verbosity: u8) -> ProgressBar {
    if verbosity > 0 {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Asking the model for a commit message...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
