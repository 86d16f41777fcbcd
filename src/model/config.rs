use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ops::sort::SortKey;

/// User configuration from `config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the notes (default: current directory)
    #[serde(default)]
    pub notes_directory: Option<PathBuf>,
    /// Default sort for listings
    #[serde(default)]
    pub sort: SortKey,
    /// Reverse the default sort
    #[serde(default)]
    pub reverse: bool,
    /// Default task filter name (all, open, done, active, overdue, today, week)
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Area applied to new tasks when none is given
    #[serde(default)]
    pub default_area: Option<String>,
    /// How long `new` waits for the directory lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            notes_directory: None,
            sort: SortKey::default(),
            reverse: false,
            filter: default_filter(),
            default_area: None,
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

fn default_filter() -> String {
    "all".to_string()
}

fn default_lock_timeout_ms() -> u64 {
    5000
}
