use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::Config;

/// Error type for configuration files
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("{0} already exists")]
    AlreadyExists(PathBuf),
}

/// Config file path, respecting XDG_CONFIG_HOME
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".config"));
    config_dir.join("denote-tasks").join("config.toml")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Read the config at `path`. A missing file yields the defaults; a file
/// that exists but does not parse is an error.
pub fn read_config_from(path: &Path) -> Result<Config, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        Err(e) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    toml::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read the config from the default location.
pub fn read_config() -> Result<Config, ConfigError> {
    read_config_from(&config_path())
}

/// Starter config written by `dt config init`
pub fn default_config_text() -> &'static str {
    r#"# denote-tasks configuration

# Directory holding the notes (default: the current directory)
# notes_directory = "~/notes"

# Default listing order: priority, due, status, id, created, modified
sort = "modified"
reverse = false

# Default task filter: all, open, done, paused, delegated, dropped,
# active, overdue, today, week
filter = "all"

# Area applied to new tasks when none is given
# default_area = "work"

# How long `dt new` waits for the directory lock
lock_timeout_ms = 5000
"#
}

/// Write the starter config to `path`, creating parent directories.
/// Refuses to overwrite an existing file.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }
    let to_err = |e: std::io::Error| ConfigError::Write {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(to_err)?;
    }
    fs::write(path, default_config_text()).map_err(to_err)
}

/// Expand a leading `~/` against $HOME.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home_dir().join(rest),
        Err(_) => path.to_path_buf(),
    }
}
