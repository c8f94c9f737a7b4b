//! Editor plugin resolution
//!
//! The compiler only needs a local path for every requested plugin. Getting
//! it is the job of a `PluginCache`; progress is reported to a
//! `ProgressSink`. Both are traits so the compiler can run against the disk
//! cache, an offline cache, or test doubles.

pub mod cache;
pub mod fetch;
pub mod progress;
pub mod resolve;
#[cfg(test)]
pub(crate) mod testing;

pub use cache::DiskPluginCache;
pub use fetch::{HttpFetcher, MarketplaceVendor, PluginFetcher};
pub use progress::TracingProgress;
pub use resolve::{resolve_plugins, ResolveOptions};

use crate::error::EnvGraphResult;
use crate::spec::PluginRef;
use async_trait::async_trait;
use std::path::PathBuf;

/// A plugin available on the local filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlugin {
    pub plugin: PluginRef,

    /// Local directory holding the unpacked extension
    pub source: PathBuf,

    /// Install location under the install root, from `PluginCache::install_subpath`
    pub install_subpath: String,

    /// Served from cache; for reporting only
    pub was_cached: bool,
}

/// Result of a fetch-or-cache call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPlugin {
    pub path: PathBuf,
    pub cached: bool,
}

/// Plugin download and cache client
#[async_trait]
pub trait PluginCache: Send + Sync {
    /// Return a local path for the plugin, downloading it if needed
    async fn download_or_cache(&self, plugin: &PluginRef) -> EnvGraphResult<CachedPlugin>;

    /// Relative install location for a plugin.
    ///
    /// Names both the cache entry and the directory the plugin is copied to
    /// under the image's install root.
    fn install_subpath(&self, plugin: &PluginRef) -> String {
        plugin.to_string()
    }
}

/// Phase of a plugin fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginPhase {
    Start,
    End,
}

/// Receives plugin progress events
pub trait ProgressSink: Send + Sync {
    /// `cached` is only meaningful for `PluginPhase::End`
    fn log_plugin_event(&self, plugin: &PluginRef, phase: PluginPhase, cached: bool);
}
