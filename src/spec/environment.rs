//! Environment spec loading
//!
//! The spec is read from an `envgraph.toml` file. Fields the file leaves
//! out (ownership, working directory) fall back to the `[build]` section
//! of the user configuration.

use crate::config::schema::BuildConfig;
use crate::error::{EnvGraphError, EnvGraphResult};
use crate::spec::plugin::PluginRef;
use crate::spec::runtime::LanguageRuntime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Jupyter notebook server settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JupyterConfig {
    /// Notebook password, empty disables authentication
    pub password: String,

    /// Listen port, 0 keeps the notebook default
    pub port: u16,
}

/// RStudio server settings. Presence alone enables the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RStudioConfig {}

/// Owner applied to every installed file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ownership {
    pub uid: u32,
    pub gid: u32,
}

/// The desired development environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentSpec {
    /// Editor extensions, in declaration order
    pub plugins: Vec<PluginRef>,

    pub jupyter: Option<JupyterConfig>,

    pub rstudio: Option<RStudioConfig>,

    pub runtime: LanguageRuntime,

    pub owner: Ownership,

    /// Working directory inside the environment
    pub working_dir: String,
}

/// On-disk form of the spec, before defaults are applied
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SpecFile {
    #[serde(default)]
    plugins: Vec<PluginRef>,
    jupyter: Option<JupyterConfig>,
    rstudio: Option<RStudioConfig>,
    #[serde(default)]
    runtime: LanguageRuntime,
    uid: Option<u32>,
    gid: Option<u32>,
    working_dir: Option<String>,
}

impl EnvironmentSpec {
    /// An empty spec for the given runtime, owned by `build` defaults
    pub fn new(runtime: LanguageRuntime, build: &BuildConfig) -> Self {
        Self {
            plugins: Vec::new(),
            jupyter: None,
            rstudio: None,
            runtime,
            owner: Ownership {
                uid: build.uid,
                gid: build.gid,
            },
            working_dir: build.working_dir.clone(),
        }
    }

    /// Load a spec from a TOML file on disk
    pub async fn from_file(path: &Path, build: &BuildConfig) -> EnvGraphResult<Self> {
        if !path.exists() {
            return Err(EnvGraphError::SpecNotFound(path.to_path_buf()));
        }

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            EnvGraphError::io(format!("reading environment spec {}", path.display()), e)
        })?;

        Self::parse_at(&content, path, build)
    }

    /// Parse a spec from a TOML string
    pub fn parse(content: &str, build: &BuildConfig) -> EnvGraphResult<Self> {
        Self::parse_at(content, Path::new("envgraph.toml"), build)
    }

    fn parse_at(content: &str, path: &Path, build: &BuildConfig) -> EnvGraphResult<Self> {
        let file: SpecFile = toml::from_str(content).map_err(|e| EnvGraphError::SpecInvalid {
            path: PathBuf::from(path),
            reason: e.to_string(),
        })?;

        Ok(Self {
            plugins: file.plugins,
            jupyter: file.jupyter,
            rstudio: file.rstudio,
            runtime: file.runtime,
            owner: Ownership {
                uid: file.uid.unwrap_or(build.uid),
                gid: file.gid.unwrap_or(build.gid),
            },
            working_dir: file
                .working_dir
                .unwrap_or_else(|| build.working_dir.clone()),
        })
    }
}
