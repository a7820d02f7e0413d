use std::path::PathBuf;

use log::LevelFilter;

/// Printed before every read, and again from the signal handlers.
pub const PROMPT: &str = "sh >> ";

const LOG_LEVEL_VAR: &str = "SIMPLE_SHELL_LOG";
const LOG_FILE_VAR: &str = "SIMPLE_SHELL_LOG_FILE";
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Warn;

/// Startup settings. The shell takes no flags; everything comes from the
/// environment and is read once.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub log_level: LevelFilter,
    /// Append log records here instead of writing them to stderr.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: DEFAULT_LOG_LEVEL,
            log_file: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let log_level = lookup(LOG_LEVEL_VAR)
            .as_deref()
            .and_then(parse_level)
            .unwrap_or(DEFAULT_LOG_LEVEL);
        let log_file = lookup(LOG_FILE_VAR)
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Config { log_level, log_file }
    }
}

fn parse_level(value: &str) -> Option<LevelFilter> {
    value.trim().parse().ok()
}
