//! Configuration loading for the autolink engine
//!
//! TOML configuration with embedded defaults. The rule list lives under
//! `[[links]]`; `[boundary]` tunes the right-boundary terminator set.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::compiler::BoundaryOptions;
use crate::rule::Rule;

/// General configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Also rewrite messages when they are edited, not only when posted
    pub enable_on_update: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            enable_on_update: false,
        }
    }
}

/// Configuration load failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub boundary: BoundaryOptions,
    pub links: Vec<Rule>,
}

impl Config {
    /// Load configuration from the standard locations, or use defaults.
    pub fn load() -> Self {
        for path in Self::standard_paths() {
            if path.exists() {
                match Self::load_from(&path) {
                    Ok(config) => return config,
                    Err(err) => {
                        eprintln!("Warning: {}", err);
                    }
                }
            }
        }

        Config::default()
    }

    /// The standard configuration locations, in probe order: the user
    /// config directory first, then the system-wide file. Every consumer
    /// of "the" config file must resolve it through this list so the admin
    /// and rewrite surfaces never disagree on which file is in effect.
    pub fn standard_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("autolink/config.toml"));
        }
        paths.push(PathBuf::from("/etc/autolink/config.toml"));
        paths
    }

    /// The first standard location that exists, if any.
    pub fn find() -> Option<PathBuf> {
        Self::standard_paths().into_iter().find(|path| path.exists())
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Expand a leading `~/` in path strings.
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }
}

/// Embedded default configuration
pub const DEFAULT_CONFIG_TOML: &str = r#"
[general]
enable_on_update = false

[boundary]
suffix_terminators = ".!?,)"

[[links]]
name = "Jira"
pattern = '(?P<key>MM-\d+)'
template = '[${key}](https://mattermost.atlassian.net/browse/${key})'
process_bot_posts = false

# Masks social security numbers; disabled until explicitly enabled
[[links]]
name = "SSN"
disabled = true
pattern = '(?P<SSN>(?P<part1>\d{3})[ -]?(?P<part2>\d{2})[ -]?(?P<LastFour>[0-9]{4}))'
template = 'XXX-XX-${LastFour}'
"#;
