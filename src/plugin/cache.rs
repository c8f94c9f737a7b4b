//! On-disk plugin cache
//!
//! Unpacked extensions live at `{root}/{vendor}/{vendor.name-version}/extension`.
//! A present entry is a cache hit. A miss is fetched into a private staging
//! directory and renamed into place, so an interrupted fetch never leaves a
//! half-written entry behind and the next run simply starts over.

use crate::error::{EnvGraphError, EnvGraphResult};
use crate::plugin::fetch::{MarketplaceVendor, PluginFetcher, VSIX_EXTENSION_DIR};
use crate::plugin::{CachedPlugin, PluginCache};
use crate::spec::PluginRef;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

const STAGING_PREFIX: &str = ".staging-";

/// Staging directory removed on drop
struct StagingDir(PathBuf);

impl StagingDir {
    fn new(path: PathBuf) -> Self {
        Self(path)
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.0) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove staging dir {}: {}", self.0.display(), e),
        }
    }
}

/// A plugin present in the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub vendor: String,
    pub plugin: String,
    pub path: PathBuf,
}

/// Plugin cache backed by a directory
pub struct DiskPluginCache {
    root: PathBuf,
    vendor: MarketplaceVendor,
    /// `None` serves only what is already cached
    fetcher: Option<Box<dyn PluginFetcher>>,
}

impl DiskPluginCache {
    /// Cache that downloads misses through `fetcher`
    pub fn new(root: PathBuf, vendor: MarketplaceVendor, fetcher: Box<dyn PluginFetcher>) -> Self {
        Self {
            root,
            vendor,
            fetcher: Some(fetcher),
        }
    }

    /// Cache that never downloads
    pub fn offline(root: PathBuf, vendor: MarketplaceVendor) -> Self {
        Self {
            root,
            vendor,
            fetcher: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn vendor_dir(&self) -> PathBuf {
        self.root.join(self.vendor.to_string())
    }

    fn entry_dir(&self, plugin: &PluginRef) -> PathBuf {
        self.vendor_dir().join(self.install_subpath(plugin))
    }

    /// Path of the unpacked extension for a plugin
    pub fn plugin_path(&self, plugin: &PluginRef) -> PathBuf {
        self.entry_dir(plugin).join(VSIX_EXTENSION_DIR)
    }

    async fn fetch_into_cache(
        &self,
        fetcher: &dyn PluginFetcher,
        plugin: &PluginRef,
    ) -> EnvGraphResult<PathBuf> {
        let staging = StagingDir::new(
            self.vendor_dir()
                .join(format!("{}{}", STAGING_PREFIX, uuid::Uuid::new_v4())),
        );
        fs::create_dir_all(staging.path())
            .await
            .map_err(|e| EnvGraphError::io(format!("creating {}", staging.path().display()), e))?;

        // Staging is removed when `staging` drops, including when this
        // future is dropped mid-fetch
        self.install_from_staging(fetcher, plugin, staging.path())
            .await
    }

    async fn install_from_staging(
        &self,
        fetcher: &dyn PluginFetcher,
        plugin: &PluginRef,
        staging: &Path,
    ) -> EnvGraphResult<PathBuf> {
        let extension = fetcher.fetch(plugin, staging).await?;

        // Stage `<staging>/entry/extension`, then rename the whole entry
        let staged_entry = staging.join("entry");
        fs::create_dir_all(&staged_entry)
            .await
            .map_err(|e| EnvGraphError::io("creating staged entry", e))?;
        fs::rename(&extension, staged_entry.join(VSIX_EXTENSION_DIR))
            .await
            .map_err(|e| EnvGraphError::io("moving unpacked extension", e))?;

        let entry = self.entry_dir(plugin);
        if entry.exists() {
            // Leftover without an extension dir, replaced wholesale
            fs::remove_dir_all(&entry)
                .await
                .map_err(|e| EnvGraphError::io(format!("removing {}", entry.display()), e))?;
        }
        fs::rename(&staged_entry, &entry)
            .await
            .map_err(|e| EnvGraphError::io(format!("installing {}", entry.display()), e))?;

        Ok(entry.join(VSIX_EXTENSION_DIR))
    }

    /// List cached plugins for every vendor
    pub async fn list(&self) -> EnvGraphResult<Vec<CacheEntry>> {
        let mut entries = Vec::new();

        let mut vendors = match fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(entries), // Cache never populated
            Err(e) => {
                return Err(EnvGraphError::io(
                    format!("reading cache directory {}", self.root.display()),
                    e,
                ))
            }
        };

        while let Some(vendor) = vendors
            .next_entry()
            .await
            .map_err(|e| EnvGraphError::io("reading cache directory", e))?
        {
            if !vendor.path().is_dir() {
                continue;
            }
            let vendor_name = vendor.file_name().to_string_lossy().to_string();

            let mut plugins = fs::read_dir(vendor.path())
                .await
                .map_err(|e| EnvGraphError::io("reading vendor directory", e))?;
            while let Some(plugin) = plugins
                .next_entry()
                .await
                .map_err(|e| EnvGraphError::io("reading cache entry", e))?
            {
                let name = plugin.file_name().to_string_lossy().to_string();
                if name.starts_with(STAGING_PREFIX) {
                    continue;
                }
                let path = plugin.path().join(VSIX_EXTENSION_DIR);
                if path.is_dir() {
                    entries.push(CacheEntry {
                        vendor: vendor_name.clone(),
                        plugin: name,
                        path,
                    });
                }
            }
        }

        entries.sort_by(|a, b| (&a.vendor, &a.plugin).cmp(&(&b.vendor, &b.plugin)));
        Ok(entries)
    }

    /// Remove every cached plugin
    pub async fn clear(&self) -> EnvGraphResult<()> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root).await.map_err(|e| {
                EnvGraphError::io(format!("removing cache {}", self.root.display()), e)
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl PluginCache for DiskPluginCache {
    async fn download_or_cache(&self, plugin: &PluginRef) -> EnvGraphResult<CachedPlugin> {
        let path = self.plugin_path(plugin);

        if path.is_dir() {
            debug!("Plugin {} found in cache at {}", plugin, path.display());
            return Ok(CachedPlugin { path, cached: true });
        }

        let Some(fetcher) = self.fetcher.as_deref() else {
            return Err(EnvGraphError::PluginNotCached(plugin.to_string()));
        };

        let path = self.fetch_into_cache(fetcher, plugin).await?;
        debug!("Plugin {} cached at {}", plugin, path.display());
        Ok(CachedPlugin {
            path,
            cached: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::testing::RecordingProgress;
    use crate::plugin::{resolve_plugins, ResolveOptions};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Writes a minimal unpacked extension, or fails on request
    struct StubFetcher {
        fetches: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl PluginFetcher for StubFetcher {
        async fn fetch(&self, plugin: &PluginRef, staging: &Path) -> EnvGraphResult<PathBuf> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(EnvGraphError::PluginDownload {
                    url: plugin.to_string(),
                    reason: "404".to_string(),
                });
            }
            let ext = staging.join("unpacked").join("extension");
            std::fs::create_dir_all(&ext).unwrap();
            std::fs::write(ext.join("package.json"), format!("{{\"name\":\"{}\"}}", plugin.name()))
                .unwrap();
            Ok(ext)
        }
    }

    fn cache(temp: &TempDir, fail: bool) -> (DiskPluginCache, Arc<AtomicUsize>) {
        let fetches = Arc::new(AtomicUsize::new(0));
        let fetcher = StubFetcher {
            fetches: fetches.clone(),
            fail,
        };
        let cache = DiskPluginCache::new(
            temp.path().join("plugins"),
            MarketplaceVendor::OpenVsx,
            Box::new(fetcher),
        );
        (cache, fetches)
    }

    fn plugin() -> PluginRef {
        "ms-python.python-2021.11.1".parse().unwrap()
    }

    #[tokio::test]
    async fn miss_then_hit() {
        let temp = TempDir::new().unwrap();
        let (cache, fetches) = cache(&temp, false);

        let first = cache.download_or_cache(&plugin()).await.unwrap();
        assert!(!first.cached);
        assert_eq!(
            first.path,
            temp.path()
                .join("plugins/openvsx/ms-python.python-2021.11.1/extension")
        );
        assert!(first.path.join("package.json").exists());

        let second = cache.download_or_cache(&plugin()).await.unwrap();
        assert!(second.cached);
        assert_eq!(second.path, first.path);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_no_entry() {
        let temp = TempDir::new().unwrap();
        let (cache, _) = cache(&temp, true);

        assert!(cache.download_or_cache(&plugin()).await.is_err());
        assert!(!cache.entry_dir(&plugin()).exists());

        let leftovers: Vec<_> = std::fs::read_dir(temp.path().join("plugins/openvsx"))
            .unwrap()
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn offline_miss_errors() {
        let temp = TempDir::new().unwrap();
        let cache = DiskPluginCache::offline(temp.path().to_path_buf(), MarketplaceVendor::OpenVsx);

        let err = cache.download_or_cache(&plugin()).await.unwrap_err();
        assert!(matches!(err, EnvGraphError::PluginNotCached(_)));
    }

    #[tokio::test]
    async fn list_and_clear() {
        let temp = TempDir::new().unwrap();
        let (cache, _) = cache(&temp, false);

        assert!(cache.list().await.unwrap().is_empty());

        cache.download_or_cache(&plugin()).await.unwrap();
        let other: PluginRef = "golang.go-0.30.0".parse().unwrap();
        cache.download_or_cache(&other).await.unwrap();

        let entries = cache.list().await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.plugin.as_str()).collect();
        assert_eq!(names, vec!["golang.go-0.30.0", "ms-python.python-2021.11.1"]);
        assert!(entries.iter().all(|e| e.vendor == "openvsx"));

        cache.clear().await.unwrap();
        assert!(cache.list().await.unwrap().is_empty());
    }

    /// Unpacks `a.slow-*` slowly and fails every `b.bad-*` quickly
    struct RacingFetcher;

    #[async_trait]
    impl PluginFetcher for RacingFetcher {
        async fn fetch(&self, plugin: &PluginRef, staging: &Path) -> EnvGraphResult<PathBuf> {
            if plugin.name() == "bad" {
                tokio::time::sleep(Duration::from_millis(20)).await;
                return Err(EnvGraphError::PluginDownload {
                    url: plugin.to_string(),
                    reason: "502".to_string(),
                });
            }
            let ext = staging.join("unpacked").join("extension");
            std::fs::create_dir_all(&ext).unwrap();
            std::fs::write(ext.join("package.json"), "{}").unwrap();
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(ext)
        }
    }

    #[tokio::test]
    async fn cancelled_fetch_removes_staging() {
        let temp = TempDir::new().unwrap();
        let cache = DiskPluginCache::new(
            temp.path().join("plugins"),
            MarketplaceVendor::OpenVsx,
            Box::new(RacingFetcher),
        );
        let plugins: Vec<PluginRef> = ["a.slow-1.0", "b.bad-1.0"]
            .iter()
            .map(|p| p.parse().unwrap())
            .collect();

        let err = resolve_plugins(
            &plugins,
            &cache,
            &RecordingProgress::default(),
            ResolveOptions { concurrency: 2 },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("b.bad-1.0"));

        let leftovers: Vec<_> = std::fs::read_dir(temp.path().join("plugins/openvsx"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert!(leftovers.is_empty(), "leftover entries: {:?}", leftovers);
    }

    #[tokio::test]
    async fn list_reports_unreadable_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("plugins");
        std::fs::write(&root, "not a directory").unwrap();

        let cache = DiskPluginCache::offline(root, MarketplaceVendor::OpenVsx);
        assert!(matches!(
            cache.list().await.unwrap_err(),
            EnvGraphError::Io { .. }
        ));
    }
}
