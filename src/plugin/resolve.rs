//! Plugin resolution
//!
//! Each plugin resolves independently into a `ResolvedPlugin` or an error;
//! results are folded back in declaration order. The first failure aborts
//! the whole phase and names the plugin that failed.

use crate::error::{EnvGraphError, EnvGraphResult};
use crate::plugin::{PluginCache, PluginPhase, ProgressSink, ResolvedPlugin};
use crate::spec::PluginRef;
use futures_util::stream::{self, StreamExt};
use tracing::debug;

/// How plugins are fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Fetches in flight at once; 0 and 1 both mean sequential
    pub concurrency: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

/// Resolve every plugin to a local path.
///
/// Output order always matches `plugins`. With `concurrency > 1` fetches
/// overlap, but each plugin still reports start before end, and the first
/// failure to complete is returned while the remaining fetches are dropped.
pub async fn resolve_plugins(
    plugins: &[PluginRef],
    cache: &dyn PluginCache,
    progress: &dyn ProgressSink,
    options: ResolveOptions,
) -> EnvGraphResult<Vec<ResolvedPlugin>> {
    if options.concurrency <= 1 {
        let mut resolved = Vec::with_capacity(plugins.len());
        for plugin in plugins {
            resolved.push(resolve_one(plugin, cache, progress).await?);
        }
        return Ok(resolved);
    }

    debug!(
        "Resolving {} plugins with concurrency {}",
        plugins.len(),
        options.concurrency
    );

    let mut pending = stream::iter(plugins.iter().enumerate())
        .map(|(index, plugin)| async move { (index, resolve_one(plugin, cache, progress).await) })
        .buffer_unordered(options.concurrency);

    let mut slots: Vec<Option<ResolvedPlugin>> = vec![None; plugins.len()];
    while let Some((index, result)) = pending.next().await {
        slots[index] = Some(result?);
    }

    Ok(slots.into_iter().flatten().collect())
}

async fn resolve_one(
    plugin: &PluginRef,
    cache: &dyn PluginCache,
    progress: &dyn ProgressSink,
) -> EnvGraphResult<ResolvedPlugin> {
    progress.log_plugin_event(plugin, PluginPhase::Start, false);

    let fetched = cache
        .download_or_cache(plugin)
        .await
        .map_err(|e| EnvGraphError::resolution(plugin.clone(), e))?;

    progress.log_plugin_event(plugin, PluginPhase::End, fetched.cached);

    Ok(ResolvedPlugin {
        plugin: plugin.clone(),
        source: fetched.path,
        install_subpath: cache.install_subpath(plugin),
        was_cached: fetched.cached,
    })
}
