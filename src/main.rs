use anyhow::Result;
use clap::Parser;
use roamfind::cli;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let args = cli::Args::parse();
    cli::init_logging(&args);
    log::debug!("Starting roamfind v{}", env!("CARGO_PKG_VERSION"));

    cli::run(args)
}
