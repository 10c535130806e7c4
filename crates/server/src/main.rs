use std::sync::Arc;

mod config;
mod rpc;
mod state;

use config::ServerConfig;
use linekv_runtime::logging;
use log::{Level, info};
use state::ServerState;

fn main() -> anyhow::Result<()> {
    logging::init(Level::Info).ok();

    let config = ServerConfig::from_env()?;

    info!(
        "Starting linekv server: listen={}, databases={}",
        config.listen,
        config.databases.join(",")
    );

    let state = Arc::new(ServerState::new(config));
    rpc::run_rpc_server(state)
}
