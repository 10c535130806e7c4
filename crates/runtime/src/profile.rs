use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::default_profile_path;

/// Connection settings persisted between runs.
///
/// Every field is optional: command-line flags fill or override whatever the
/// profile leaves out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionProfile {
    pub addr: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("failed to read profile {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("malformed profile {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl ConnectionProfile {
    /// Load a profile from an explicit path. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let text = fs::read_to_string(path).map_err(|source| ProfileError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&text).map_err(|source| ProfileError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the profile at the default location, if there is one.
    ///
    /// A missing default profile yields an empty profile; a present but broken
    /// one is still reported.
    pub fn load_default() -> Result<Self, ProfileError> {
        let Some(path) = default_profile_path() else {
            debug!("No config directory; using an empty connection profile");
            return Ok(Self::default());
        };

        Self::load_optional(&path)
    }

    pub fn load_optional(path: &Path) -> Result<Self, ProfileError> {
        match Self::load(path) {
            Err(ProfileError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                debug!("No profile at {}", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
