//! Error taxonomy for configuration loading and build runs.
//!
//! Every variant is fatal to the run. Nothing here is retried or recovered
//! locally; the frontend prints the error and exits with status `1`.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while turning `build.json` into a [`crate::config::BuildConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot open {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse build description: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("'cpp_source' must list at least one unit")]
    EmptyUnitList,

    #[error("Unit #{index} must be a string or an object")]
    InvalidUnitShape { index: usize },

    #[error("Unit #{index} has a malformed field: {source}")]
    InvalidUnitField {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unit #{index} has no name")]
    MissingUnitName { index: usize },
}

/// Failure during a build run.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Input directory '{}' does not exist", .0.display())]
    MissingInputDir(PathBuf),

    #[error("Cannot create output directory '{}': {source}", path.display())]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Command is {len} bytes long, the limit is {max}")]
    CommandTooLong { len: usize, max: usize },

    #[error("Cannot compile unit '{unit}'")]
    Compile { unit: String },

    #[error("Linking failed")]
    Link,

    #[error("Failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// `true` for errors raised while validating directories.
    pub fn is_environment(&self) -> bool {
        matches!(
            self,
            BuildError::MissingInputDir(_) | BuildError::CreateOutputDir { .. }
        )
    }
}
