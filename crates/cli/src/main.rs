use std::process::ExitCode;

use clap::Parser;
use log::Level;

mod args;
mod run;
mod settings;

use args::Cli;
use linekv_runtime::logging;

fn main() -> ExitCode {
    logging::init(Level::Info).ok();

    let cli = Cli::parse();
    run::run(cli)
}
