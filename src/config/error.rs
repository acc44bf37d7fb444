//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config file {path}: {message}")]
    Read {
        /// Config file path
        path: PathBuf,
        /// Underlying I/O error
        message: String,
    },

    /// The config file is not valid JSON for this schema.
    #[error("invalid config file {path}: {message}")]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Parser error
        message: String,
    },

    /// No user id was given on the command line, in the environment or in
    /// the config file.
    #[error("no user id configured")]
    MissingUser,

    /// The home directory could not be determined.
    #[error("could not determine the home directory")]
    NoHomeDir,
}

impl ConfigError {
    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Read { .. } => "check the config file permissions",
            Self::Parse { .. } => "fix or remove the config file; every field is optional",
            Self::MissingUser => "pass --user, set STUDYFOCUS_USER, or add \"user_id\" to the config file",
            Self::NoHomeDir => "pass --data-dir and --socket explicitly",
        }
    }
}
