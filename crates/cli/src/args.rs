use std::path::PathBuf;

use clap::Parser;
use linekv_runtime::{
    DEFAULT_BATCH_SIZE, DEFAULT_KEY_PREFIX, DEFAULT_MAX_LINE_BYTES, DEFAULT_QUEUE_DEPTH,
};

/// Load lines from stdin into a key-value store in fixed-size batches,
/// or read them back and check them.
///
/// Example:
///   seq 1 100000 | linekv --addr 10.0.0.7 --batchsize 5000
///   seq 1 100000 | linekv --addr 10.0.0.7 --readback
#[derive(Debug, Parser)]
#[command(name = "linekv", version, about)]
pub struct Cli {
    /// Address of the store server
    #[arg(long, env = "LINEKV_ADDR")]
    pub addr: Option<String>,

    /// Port of the store server [default: 3322]
    #[arg(long, env = "LINEKV_PORT")]
    pub port: Option<u16>,

    /// User name for the store session [default: linekv]
    #[arg(long, env = "LINEKV_USER")]
    pub user: Option<String>,

    /// Password for the store session [default: linekv]
    #[arg(long = "pass", env = "LINEKV_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Database to use [default: defaultdb]
    #[arg(long = "db", env = "LINEKV_DB")]
    pub database: Option<String>,

    /// Records per store request
    #[arg(long = "batchsize", alias = "batch-size", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Initial counter value added to every line number
    #[arg(long, default_value_t = 0)]
    pub offset: u64,

    /// Prefix for key generation
    #[arg(long, default_value = DEFAULT_KEY_PREFIX)]
    pub prefix: String,

    /// Don't write; read the keys back instead and check the values
    #[arg(long)]
    pub readback: bool,

    /// Lines buffered between the stdin reader and the store requests
    #[arg(long, default_value_t = DEFAULT_QUEUE_DEPTH)]
    pub queue_depth: usize,

    /// Longest accepted input line in bytes; a longer line ends the input
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_BYTES)]
    pub max_line_bytes: usize,

    /// Connection profile (JSON) to read instead of the default one
    #[arg(long, value_name = "PATH")]
    pub profile: Option<PathBuf>,
}
