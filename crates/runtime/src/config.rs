use std::path::PathBuf;

pub const PROGRAM_NAME: &str = "linekv";
pub const PROGRAM_LOG_LEVEL: &str = "LINEKV_LOG_LEVEL";
pub const PROFILE_FILE_NAME: &str = "profile.json";

pub const DEFAULT_PORT: u16 = 3322;
pub const DEFAULT_USER: &str = "linekv";
pub const DEFAULT_PASSWORD: &str = "linekv";
pub const DEFAULT_DATABASE: &str = "defaultdb";

/// Records per write/verify request.
pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_KEY_PREFIX: &str = "LINE";

/// Lines buffered between the stdin reader and the batch consumer.
pub const DEFAULT_QUEUE_DEPTH: usize = 1024;

/// Longest accepted input line. Anything larger ends the input like a read error.
/// A full default batch of lines this long still fits in one request frame.
pub const DEFAULT_MAX_LINE_BYTES: usize = 32 * 1024;

pub fn xdg_or_home(xdg_var: &str, home_suffix: &str) -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(xdg_var)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }

    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(home_suffix))
        .or_else(dirs::config_dir)
}

pub fn linekv_config_dir() -> Option<PathBuf> {
    xdg_or_home("XDG_CONFIG_HOME", ".config").map(|d| d.join(PROGRAM_NAME))
}

/// Default location of the connection profile
pub fn default_profile_path() -> Option<PathBuf> {
    linekv_config_dir().map(|d| d.join(PROFILE_FILE_NAME))
}
