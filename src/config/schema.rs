//! Configuration schema for envgraph
//!
//! Configuration is stored at `~/.config/envgraph/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Extension marketplace and plugin cache
    pub marketplace: MarketplaceConfig,

    /// Defaults applied to compiled build graphs
    pub build: BuildConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Marketplace settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplaceConfig {
    /// Marketplace vendor: "openvsx" or "vscode"
    pub vendor: String,

    /// Plugin cache directory (defaults to `~/.cache/envgraph/plugins`)
    pub cache_dir: Option<PathBuf>,

    /// Plugins fetched at once (1 = sequential)
    pub concurrency: usize,

    /// Only use plugins already in the cache
    pub offline: bool,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            vendor: "openvsx".to_string(),
            cache_dir: None,
            concurrency: 1,
            offline: false,
        }
    }
}

/// Build graph defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory plugins are installed under
    pub install_root: String,

    /// Default owner uid for installed files
    pub uid: u32,

    /// Default owner gid for installed files
    pub gid: u32,

    /// Default working directory for services
    pub working_dir: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            install_root: "/home/envd/.vscode-server/extensions".to_string(),
            uid: 1000,
            gid: 1000,
            working_dir: "/home/envd".to_string(),
        }
    }
}
