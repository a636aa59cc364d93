//! Configuration for trellis

use crate::TrellisError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// File name of the optional per-collection config, looked up under the
/// collection root.
pub const CONFIG_FILE_NAME: &str = ".trellis.toml";

/// Default configuration as TOML
pub const DEFAULT_CONFIG: &str = r#"# Trellis Configuration

[core]
# Minimum time between structural rescans of the collection (e.g., "5s", "2m")
rescan_interval = "5s"
# Maximum results returned by a completion search
max_results = 50
# Recognized document extension (without the dot)
extension = "md"

[ignore]
# Directory/file patterns excluded from scans (beyond .gitignore)
patterns = [
    ".git",
    ".obsidian",
    "node_modules",
    ".DS_Store",
]
"#;

/// Trellis configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub core: CoreConfig,
    #[serde(default)]
    pub ignore: IgnoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    #[serde(default = "default_rescan_interval")]
    pub rescan_interval: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_extension")]
    pub extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgnoreConfig {
    #[serde(default = "default_ignore_patterns")]
    pub patterns: Vec<String>,
}

// Default value functions
fn default_rescan_interval() -> String {
    "5s".to_string()
}
fn default_max_results() -> usize {
    50
}
fn default_extension() -> String {
    "md".to_string()
}
fn default_ignore_patterns() -> Vec<String> {
    vec![
        ".git".to_string(),
        ".obsidian".to_string(),
        "node_modules".to_string(),
        ".DS_Store".to_string(),
    ]
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            rescan_interval: default_rescan_interval(),
            max_results: default_max_results(),
            extension: default_extension(),
        }
    }
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            patterns: default_ignore_patterns(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load the config found under `root`, or defaults when absent
    pub fn load_for_root(root: &Path) -> Self {
        let path = root.join(CONFIG_FILE_NAME);
        if path.exists() {
            match Self::load(&path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                }
            }
        }
        Self::default()
    }

    /// Parse config from TOML string
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| TrellisError::ConfigParse(e.to_string()))
    }

    /// Get the rescan interval as Duration
    pub fn rescan_interval(&self) -> Duration {
        parse_duration(&self.core.rescan_interval).unwrap_or(Duration::from_secs(5))
    }
}

/// Parse duration string (e.g., "500ms", "5s", "2m")
fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(num) = s.strip_suffix("ms") {
        return num.parse().ok().map(Duration::from_millis);
    }

    let (num_str, unit) = s.split_at(s.len().checked_sub(1)?);
    let num: u64 = num_str.parse().ok()?;

    match unit {
        "s" => Some(Duration::from_secs(num)),
        "m" => Some(Duration::from_secs(num * 60)),
        "h" => Some(Duration::from_secs(num * 3600)),
        _ => None,
    }
}
