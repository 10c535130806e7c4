use std::{
    io::{self, BufReader},
    process::ExitCode,
};

use linekv_pipeline::{Pipeline, PipelineError, RunStats};
use linekv_store::RemoteStore;
use log::{error, info};

use crate::{args::Cli, settings::Settings};

const EXIT_FAILURE: u8 = 1;
const EXIT_CONFIG: u8 = 2;

pub fn run(cli: Cli) -> ExitCode {
    let settings = match Settings::from_cli(&cli) {
        Ok(s) => s,
        Err(e) => {
            error!("Invalid configuration: {e:#}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    match execute(settings) {
        Ok(stats) => {
            if stats.read_error {
                info!("Input ended with a read error; processed lines were kept");
            }
            ExitCode::SUCCESS
        }
        Err(e) if e.is_config() => {
            error!("{e}");
            ExitCode::from(EXIT_CONFIG)
        }
        Err(e) => {
            error!("{e}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn execute(settings: Settings) -> Result<RunStats, PipelineError> {
    let Settings { connect, pipeline } = settings;

    info!(
        "Starting {} run against {}:{}/{}",
        pipeline.mode, connect.addr, connect.port, connect.database
    );

    Pipeline::new(pipeline)?
        .connect(|| RemoteStore::connect(&connect))?
        .run(BufReader::new(io::stdin()))
}
