//! Error types for envgraph
//!
//! All modules use `EnvGraphResult<T>` as their return type.

use crate::spec::PluginRef;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for envgraph operations
pub type EnvGraphResult<T> = Result<T, EnvGraphError>;

/// All errors that can occur while compiling an environment
#[derive(Error, Debug)]
pub enum EnvGraphError {
    // Compilation errors
    #[error("Failed to resolve plugin {plugin}: {source}")]
    PluginResolutionFailed {
        plugin: PluginRef,
        #[source]
        source: Box<EnvGraphError>,
    },

    #[error("{feature} is not supported in {runtime} yet")]
    UnsupportedFeatureCombination { feature: String, runtime: String },

    #[error("Plugin {vendor}.{name} requested with conflicting versions: {first} and {second}")]
    ConflictingPluginVersions {
        vendor: String,
        name: String,
        first: String,
        second: String,
    },

    // Spec errors
    #[error("Invalid plugin reference '{input}': {reason}")]
    InvalidPluginRef { input: String, reason: String },

    #[error("Invalid environment spec at {path}: {reason}")]
    SpecInvalid { path: PathBuf, reason: String },

    #[error("Environment spec not found: {0}")]
    SpecNotFound(PathBuf),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Plugin cache errors
    #[error("Download failed: {url}: {reason}")]
    PluginDownload { url: String, reason: String },

    #[error("Failed to extract {archive}: {reason}")]
    PluginExtract { archive: PathBuf, reason: String },

    #[error("Plugin not present in cache: {0}")]
    PluginNotCached(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EnvGraphError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Wrap a cache client failure with the identity of the plugin being fetched
    pub fn resolution(plugin: PluginRef, source: EnvGraphError) -> Self {
        Self::PluginResolutionFailed {
            plugin,
            source: Box::new(source),
        }
    }

    /// Check if error is retryable by the caller.
    ///
    /// The compiler itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::PluginDownload { .. } => true,
            Self::PluginResolutionFailed { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::UnsupportedFeatureCombination { .. } => {
                Some("Remove the service from the spec or switch [runtime] language")
            }
            Self::ConflictingPluginVersions { .. } => {
                Some("Keep a single version of each plugin in `plugins`")
            }
            Self::InvalidPluginRef { .. } => {
                Some("Plugins are written as vendor.name-version, e.g. ms-python.python-2021.11.1")
            }
            Self::PluginNotCached(_) => Some("Run without offline mode to download the plugin"),
            Self::PluginResolutionFailed { source, .. } if source.is_retryable() => {
                Some("Check your network connection and retry")
            }
            _ => None,
        }
    }
}
