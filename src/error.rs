use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors from loading, saving or editing the clock's preferences.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("couldn't determine the config directory for best_clock")]
    NoProjectDirs,

    #[error("couldn't read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("couldn't write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// slots are 1 based when they come from the user
    #[error("alarm slot {slot} doesn't exist, pick 1 to {max}")]
    InvalidSlot { slot: usize, max: usize },

    #[error("'{0}' is not a time, use HH:MM or HHMM")]
    InvalidTime(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
