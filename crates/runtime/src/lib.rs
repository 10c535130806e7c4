mod config;
pub mod logging;
pub mod profile;

pub use config::{
    DEFAULT_BATCH_SIZE, DEFAULT_DATABASE, DEFAULT_KEY_PREFIX, DEFAULT_MAX_LINE_BYTES,
    DEFAULT_PASSWORD, DEFAULT_PORT, DEFAULT_QUEUE_DEPTH, DEFAULT_USER, PROGRAM_LOG_LEVEL,
    PROGRAM_NAME, default_profile_path, linekv_config_dir,
};

pub use logging::init;
pub use profile::{ConnectionProfile, ProfileError};
