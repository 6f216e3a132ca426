use std::process::ExitCode;

use clap::Parser;
use qr_toolkit::cli::{self, Cli};

fn init_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let default_filter = if verbose { "qr_toolkit=debug" } else { "qr_toolkit=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // stdout carries command output; diagnostics go to stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(verbose))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
