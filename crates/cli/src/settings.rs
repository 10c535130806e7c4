use anyhow::{Result, bail};
use linekv_pipeline::{Mode, PipelineConfig};
use linekv_runtime::{
    ConnectionProfile, DEFAULT_DATABASE, DEFAULT_PASSWORD, DEFAULT_PORT, DEFAULT_USER,
};
use linekv_store::ConnectOptions;

use crate::args::Cli;

/// Everything a run needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub connect: ConnectOptions,
    pub pipeline: PipelineConfig,
}

impl Settings {
    /// Read the connection profile named on the command line (or the default
    /// one) and merge it with the flags.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let profile = match &cli.profile {
            Some(path) => ConnectionProfile::load(path)?,
            None => ConnectionProfile::load_default()?,
        };
        Self::resolve(cli, profile)
    }

    /// Flags win over the profile, the profile wins over built-in defaults.
    pub fn resolve(cli: &Cli, profile: ConnectionProfile) -> Result<Self> {
        let addr = cli
            .addr
            .clone()
            .or(profile.addr)
            .filter(|a| !a.trim().is_empty());

        let Some(addr) = addr else {
            bail!("no store address given (use --addr, LINEKV_ADDR or a profile)");
        };

        let connect = ConnectOptions {
            addr,
            port: cli.port.or(profile.port).unwrap_or(DEFAULT_PORT),
            user: cli
                .user
                .clone()
                .or(profile.user)
                .unwrap_or_else(|| DEFAULT_USER.to_string()),
            password: cli
                .password
                .clone()
                .or(profile.password)
                .unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
            database: cli
                .database
                .clone()
                .or(profile.database)
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
        };

        let pipeline = PipelineConfig {
            mode: if cli.readback {
                Mode::Verify
            } else {
                Mode::Write
            },
            batch_size: cli.batch_size,
            offset: cli.offset,
            prefix: cli.prefix.clone(),
            queue_depth: cli.queue_depth,
            max_line_bytes: cli.max_line_bytes,
        };
        pipeline.validate()?;

        Ok(Self { connect, pipeline })
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
