// Configuration file handling

use crate::state::DisplayOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file name looked up in the working and home directories
pub const CONFIG_FILE_NAME: &str = ".xrtestifyrc.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Crossplane CLI used for render and validate
    #[serde(default = "default_crossplane")]
    pub crossplane: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            crossplane: default_crossplane(),
        }
    }
}

/// What the console report shows for passing stages
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub show_render: bool,

    #[serde(default)]
    pub show_validate: bool,

    #[serde(default)]
    pub show_hooks: bool,

    #[serde(default)]
    pub show_assertions: bool,
}

impl From<OutputConfig> for DisplayOptions {
    fn from(output: OutputConfig) -> Self {
        DisplayOptions {
            verbose: output.verbose,
            show_render: output.show_render,
            show_validate: output.show_validate,
            show_hooks: output.show_hooks,
            show_assertions: output.show_assertions,
        }
    }
}

// Default values
pub const ENV_XRTESTIFY_CROSSPLANE: &str = "XRTESTIFY_CROSSPLANE";

/// `XRTESTIFY_CROSSPLANE` when set, otherwise `crossplane` from PATH
pub fn default_crossplane() -> String {
    std::env::var(ENV_XRTESTIFY_CROSSPLANE)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| String::from("crossplane"))
}

impl Config {
    /// Load configuration from default locations
    pub fn load() -> Option<Self> {
        // Check locations in order:
        // 1. .xrtestifyrc.toml (current directory)
        // 2. ~/.xrtestifyrc.toml (home directory)
        Self::search_paths()
            .iter()
            .find(|path| path.exists())
            .and_then(|path| Self::load_from_file(path))
    }

    /// Candidate config file locations, in lookup order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd.join(CONFIG_FILE_NAME));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(CONFIG_FILE_NAME));
        }
        paths
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Option<Self> {
        toml::from_str(content).ok()
    }

    /// Generate configuration as TOML
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_else(|_| String::new())
    }
}
