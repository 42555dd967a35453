//! Configuration management for ted.
//!
//! This module provides TOML configuration file loading from
//! `~/.ted/config.toml`. A missing or malformed file silently falls back
//! to the built-in defaults.
//!
//! # Configuration File
//!
//! ```toml
//! # Width of a tab stop in display columns
//! tab_stop = 8
//!
//! # Number of consecutive quit presses required to abandon unsaved changes
//! quit_confirm = 3
//!
//! # Highlight numeric literals in the text area
//! highlight_numbers = true
//! ```

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Width of a tab stop in display columns
    pub tab_stop: usize,
    /// Consecutive quit presses required while the document has unsaved changes
    pub quit_confirm: u32,
    /// Highlight numeric literals
    pub highlight_numbers: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tab_stop: 8,
            quit_confirm: 3,
            highlight_numbers: true,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Self {
        if let Some(path) = Self::get_config_path() {
            if path.exists() {
                if let Ok(content) = fs::read_to_string(&path) {
                    if let Ok(config) = toml::from_str::<Config>(&content) {
                        return config.sanitized();
                    }
                }
            }
        }
        Self::default()
    }

    /// Clamp values the rest of the editor cannot work with
    fn sanitized(mut self) -> Self {
        if self.tab_stop == 0 {
            self.tab_stop = Config::default().tab_stop;
        }
        self
    }

    /// Get config file path
    fn get_config_path() -> Option<PathBuf> {
        if let Some(home) = home_dir() {
            let ted_dir = home.join(".ted");
            if !ted_dir.exists() {
                let _ = fs::create_dir_all(&ted_dir);
            }
            return Some(ted_dir.join("config.toml"));
        }
        None
    }
}

/// Get home directory
pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.tab_stop, 8);
        assert_eq!(config.quit_confirm, 3);
        assert!(config.highlight_numbers);
    }

    #[test]
    fn test_parse_partial_file() {
        let config: Config = toml::from_str("tab_stop = 4\n").unwrap();
        assert_eq!(config.tab_stop, 4);
        assert_eq!(config.quit_confirm, 3);
        assert!(config.highlight_numbers);
    }

    #[test]
    fn test_parse_full_file() {
        let config: Config =
            toml::from_str("tab_stop = 2\nquit_confirm = 1\nhighlight_numbers = false\n").unwrap();
        assert_eq!(config.tab_stop, 2);
        assert_eq!(config.quit_confirm, 1);
        assert!(!config.highlight_numbers);
    }

    #[test]
    fn test_zero_tab_stop_is_rejected() {
        let config: Config = toml::from_str("tab_stop = 0\n").unwrap();
        assert_eq!(config.sanitized().tab_stop, 8);
    }
}
