//! Environment graph compiler
//!
//! Turns an `EnvironmentSpec` into a `CompiledPlan`: one merged layer with
//! every requested plugin, plus the launch commands of the requested
//! services. Either the whole plan is produced or an error is returned.

use crate::config::schema::BuildConfig;
use crate::error::{EnvGraphError, EnvGraphResult};
use crate::graph::{self, BuildLayer, PLUGIN_MERGE_LABEL};
use crate::plugin::{resolve_plugins, PluginCache, ProgressSink, ResolveOptions};
use crate::service::{self, ServiceCommand};
use crate::spec::{EnvironmentSpec, PluginRef};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::{debug, info};

/// Output of a compilation, handed to the build executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledPlan {
    /// Merged plugin layer, `None` when no plugins were requested
    pub plugin_layer: Option<BuildLayer>,

    pub jupyter_command: Option<ServiceCommand>,

    pub rstudio_command: Option<ServiceCommand>,
}

impl CompiledPlan {
    /// Content-addressed key of the whole plan
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();

        match &self.plugin_layer {
            Some(layer) => hasher.update(layer.digest().as_bytes()),
            None => hasher.update(b"no-plugins"),
        }
        for (name, command) in [
            ("jupyter", &self.jupyter_command),
            ("rstudio", &self.rstudio_command),
        ] {
            hasher.update(name.as_bytes());
            hasher.update(b"\0");
            if let Some(command) = command {
                for arg in command.args() {
                    hasher.update(arg.as_bytes());
                    hasher.update(b"\0");
                }
            }
            hasher.update(b"\n");
        }

        hex::encode(hasher.finalize())
    }
}

/// Compiles environment specs against a plugin cache
pub struct GraphCompiler<'a> {
    cache: &'a dyn PluginCache,
    progress: &'a dyn ProgressSink,
    install_root: String,
    options: ResolveOptions,
}

impl<'a> GraphCompiler<'a> {
    pub fn new(cache: &'a dyn PluginCache, progress: &'a dyn ProgressSink) -> Self {
        Self {
            cache,
            progress,
            install_root: BuildConfig::default().install_root,
            options: ResolveOptions::default(),
        }
    }

    /// Directory plugins are installed under
    pub fn with_install_root(mut self, install_root: impl Into<String>) -> Self {
        self.install_root = install_root.into();
        self
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Compile a spec into a build plan.
    ///
    /// The only change made to `spec` is adding the packages requested
    /// services need to the runtime; this happens before the compatibility
    /// check and is kept even if compilation fails. Nothing is fetched
    /// unless every requested service is supported by the runtime.
    pub async fn compile(&self, spec: &mut EnvironmentSpec) -> EnvGraphResult<CompiledPlan> {
        let implied = service::implied_packages(spec);
        let added = spec.runtime.add_pypi_packages(&implied);
        if added > 0 {
            debug!("Added {} implied package(s): {:?}", added, implied);
        }

        service::check_services(spec)?;

        let plugins = unique_plugins(&spec.plugins)?;
        let plugin_layer = self.compile_plugins(&plugins, spec).await?;

        let jupyter_command = service::jupyter_command(
            spec.jupyter.as_ref(),
            &spec.working_dir,
            spec.runtime.conda_enabled(),
        );
        let rstudio_command = service::rstudio_command(spec.rstudio.as_ref());

        info!(
            "Compiled environment: {} plugin(s), jupyter: {}, rstudio: {}",
            plugins.len(),
            jupyter_command.is_some(),
            rstudio_command.is_some()
        );

        Ok(CompiledPlan {
            plugin_layer,
            jupyter_command,
            rstudio_command,
        })
    }

    async fn compile_plugins(
        &self,
        plugins: &[PluginRef],
        spec: &EnvironmentSpec,
    ) -> EnvGraphResult<Option<BuildLayer>> {
        if plugins.is_empty() {
            return Ok(None);
        }

        let resolved = resolve_plugins(plugins, self.cache, self.progress, self.options).await?;

        let layers = resolved
            .iter()
            .map(|r| graph::synthesize(r, &self.install_root, spec.owner))
            .collect();

        Ok(graph::merge(layers, PLUGIN_MERGE_LABEL))
    }
}

/// Drop repeated plugins, keeping first-declared order.
///
/// Two versions of the same vendor/name are rejected.
pub fn unique_plugins(plugins: &[PluginRef]) -> EnvGraphResult<Vec<PluginRef>> {
    let mut seen: HashMap<String, &PluginRef> = HashMap::new();
    let mut unique = Vec::with_capacity(plugins.len());

    for plugin in plugins {
        match seen.get(&plugin.identity()) {
            Some(existing) if *existing == plugin => {
                debug!("Ignoring duplicate plugin {}", plugin);
            }
            Some(existing) => {
                return Err(EnvGraphError::ConflictingPluginVersions {
                    vendor: plugin.vendor().to_string(),
                    name: plugin.name().to_string(),
                    first: existing.version().to_string(),
                    second: plugin.version().to_string(),
                });
            }
            None => {
                seen.insert(plugin.identity(), plugin);
                unique.push(plugin.clone());
            }
        }
    }

    Ok(unique)
}
