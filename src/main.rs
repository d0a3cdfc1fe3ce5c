//! `portrait` binary: parses the command line and hands it to the library CLI

use clap::Parser;
use std::process::ExitCode;

use portrait_builder::cli::{self, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli::run(cli)
}
