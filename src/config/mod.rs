//! Application configuration.
//!
//! Settings come from `~/.studyfocus/config.json`; every field is optional.
//! Command line flags and `STUDYFOCUS_*` environment variables take
//! precedence over the file.
//!
//! # Example
//!
//! ```
//! use studyfocus::config::AppConfig;
//!
//! let config: AppConfig = serde_json::from_str(r#"{"user_id": "alice"}"#).unwrap();
//! assert_eq!(config.user_id.as_deref(), Some("alice"));
//! assert!(config.sound);
//! ```

mod error;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use error::ConfigError;

use crate::daemon::ipc::SOCKET_FILE_NAME;

/// Directory under the home directory holding config, data and socket.
pub const APP_DIR_NAME: &str = ".studyfocus";

/// Config file name inside [`APP_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.json";

fn default_true() -> bool {
    true
}

/// Persistent settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Account completed sessions are recorded for.
    #[serde(default)]
    pub user_id: Option<String>,

    /// Directory holding the session collection.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Daemon socket path.
    #[serde(default)]
    pub socket_path: Option<PathBuf>,

    /// Play an audio cue on completion (needs the `sound` feature).
    #[serde(default = "default_true")]
    pub sound: bool,

    /// Ring the terminal bell on completion.
    #[serde(default = "default_true")]
    pub bell: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_id: None,
            data_dir: None,
            socket_path: None,
            sound: true,
            bell: true,
        }
    }
}

impl AppConfig {
    /// Returns `~/.studyfocus`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn app_dir() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(APP_DIR_NAME))
            .ok_or(ConfigError::NoHomeDir)
    }

    /// Returns the default config file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::app_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Loads the config file at `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        };

        serde_json::from_str(&data).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Applies command line / environment overrides.
    #[must_use]
    pub fn with_overrides(
        mut self,
        user_id: Option<String>,
        data_dir: Option<PathBuf>,
        socket_path: Option<PathBuf>,
    ) -> Self {
        if user_id.is_some() {
            self.user_id = user_id;
        }
        if data_dir.is_some() {
            self.data_dir = data_dir;
        }
        if socket_path.is_some() {
            self.socket_path = socket_path;
        }
        self
    }

    /// Returns the configured, non-blank user id.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingUser` if none is configured.
    pub fn require_user(&self) -> Result<&str, ConfigError> {
        self.user_id
            .as_deref()
            .map(str::trim)
            .filter(|user| !user.is_empty())
            .ok_or(ConfigError::MissingUser)
    }

    /// Returns the data directory, defaulting to `~/.studyfocus`.
    ///
    /// # Errors
    ///
    /// Returns an error if no directory is configured and the home directory
    /// cannot be determined.
    pub fn resolve_data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::app_dir(),
        }
    }

    /// Returns the socket path, defaulting to `<data dir>/studyfocus.sock`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither a socket path nor a data directory can be
    /// resolved.
    pub fn resolve_socket_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.socket_path {
            Some(path) => Ok(path.clone()),
            None => Ok(self.resolve_data_dir()?.join(SOCKET_FILE_NAME)),
        }
    }
}
