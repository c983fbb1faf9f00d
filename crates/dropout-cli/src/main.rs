//! `dropout` binary entry point.

use std::process::ExitCode;

use clap::Parser;

use dropout_cli::cli::Cli;
use dropout_cli::commands::run;
use dropout_cli::logging::init_logging;
use dropout_cli::summary::print_summary;

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&cli.log_config()) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(Some(outcome)) => print_summary(&outcome),
        Ok(None) => println!(
            "Nothing to do: pass --getdata to assemble a table or --loaddata PATH to load one."
        ),
        Err(error) => {
            eprintln!("error: {error:#}");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
