//! Environment configuration.

use std::env;
use std::path::PathBuf;

pub const LOG_FILE_ENV: &str = "RECIPES_LOG_FILE";
pub const DEBUG_ENV: &str = "RECIPES_DEBUG";
pub const NO_HIGHLIGHT_ENV: &str = "RECIPES_NO_HIGHLIGHT";

const DEFAULT_LOG_FILE: &str = "recipes.log";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    /// Log file path override; defaults to `recipes.log` in the temp dir.
    pub log_file: Option<PathBuf>,
    pub debug: bool,
    /// Emit code blocks without syntax highlighting.
    pub no_highlight: bool,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset;
    /// flags are on only for the exact value `1`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let flag = |key: &str| value(key).is_some_and(|value| value == "1");
        Self {
            log_file: value(LOG_FILE_ENV).map(PathBuf::from),
            debug: flag(DEBUG_ENV),
            no_highlight: flag(NO_HIGHLIGHT_ENV),
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| env::temp_dir().join(DEFAULT_LOG_FILE))
    }
}
