use std::process::ExitCode;

use clap::Parser;
use gradcap::cli::{self, CliArgs};
use gradcap::logger;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Session log (overwrites the previous run's log)
    match &args.log {
        Some(path) => logger::init_at(path),
        None => logger::init(),
    }

    cli::run(args)
}
