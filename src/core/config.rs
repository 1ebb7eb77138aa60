//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::error::UtilError;

/// unixkit configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Shell history file used by `history`, `ii` and `in`
    pub history_file: Option<PathBuf>,

    /// Log filter directive (same syntax as `UNIXKIT_LOG`)
    pub log: Option<String>,

    /// Output width for column layouts when it cannot be detected
    pub width: Option<usize>,

    /// Colour directory names in `ls` when writing to a terminal
    pub color: Option<bool>,

    /// Why the config file was ignored, for logging once a subscriber exists
    #[serde(skip)]
    pub load_error: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. User config file (~/.config/unixkit/config.yaml or $UNIXKIT_CONFIG)
        if let Some(path) = Self::config_path() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(file_config) => config.merge(file_config),
                    Err(e) => config.load_error = Some(e.to_string()),
                }
            }
        }

        // 3. Environment variables
        config.apply_env(|key| std::env::var(key).ok());

        config
    }

    /// Parse a single YAML config file
    pub fn from_file(path: &Path) -> Result<Self, UtilError> {
        let contents = std::fs::read_to_string(path).map_err(|e| UtilError::path(path, e))?;
        serde_yml::from_str(&contents)
            .map_err(|e| UtilError::failed(format!("{}: {e}", path.display())))
    }

    /// Get the path to the config file
    fn config_path() -> Option<PathBuf> {
        if let Some(explicit) = std::env::var_os("UNIXKIT_CONFIG") {
            return Some(PathBuf::from(explicit));
        }
        directories::ProjectDirs::from("", "", "unixkit")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.history_file.is_some() {
            self.history_file = other.history_file;
        }
        if other.log.is_some() {
            self.log = other.log;
        }
        if other.width.is_some() {
            self.width = other.width;
        }
        if other.color.is_some() {
            self.color = other.color;
        }
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("UNIXKIT_HISTFILE").filter(|v| !v.is_empty()) {
            self.history_file = Some(PathBuf::from(path));
        }
        if let Some(filter) = var("UNIXKIT_LOG") {
            self.log = Some(filter);
        }
        if let Some(width) = var("UNIXKIT_WIDTH").and_then(|w| w.trim().parse().ok()) {
            self.width = Some(width);
        }
    }

    /// Resolve the history file: explicit setting, then `$HOME/.bash_history`
    pub fn history_path(&self) -> Result<PathBuf, UtilError> {
        if let Some(ref path) = self.history_file {
            return Ok(path.clone());
        }
        match std::env::var_os("HOME") {
            Some(home) if !home.is_empty() => Ok(PathBuf::from(home).join(".bash_history")),
            _ => Err(UtilError::failed("HOME is not set")),
        }
    }

    /// Column width for grid output, with an 80 column fallback
    pub fn width(&self) -> usize {
        self.width
            .filter(|w| *w > 0)
            .or_else(|| {
                console::Term::stdout()
                    .size_checked()
                    .map(|(_, cols)| cols as usize)
            })
            .unwrap_or(80)
    }

    pub fn color(&self) -> bool {
        self.color.unwrap_or(true)
    }
}
