//! Marketplace downloads
//!
//! A `PluginFetcher` places an unpacked extension into a staging directory.
//! `HttpFetcher` downloads the VSIX from a marketplace and unpacks it with
//! `unzip`.

use crate::error::{EnvGraphError, EnvGraphResult};
use crate::spec::PluginRef;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::process::Command;
use tracing::debug;

/// Directory inside a VSIX archive that holds the extension
pub const VSIX_EXTENSION_DIR: &str = "extension";

/// Extension marketplaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketplaceVendor {
    OpenVsx,
    VsCode,
}

impl MarketplaceVendor {
    /// Download URL of a plugin's VSIX package
    pub fn download_url(&self, plugin: &PluginRef) -> String {
        match self {
            Self::OpenVsx => format!(
                "https://open-vsx.org/api/{vendor}/{name}/{version}/file/{plugin}.vsix",
                vendor = plugin.vendor(),
                name = plugin.name(),
                version = plugin.version(),
            ),
            Self::VsCode => format!(
                "https://{vendor}.gallery.vsassets.io/_apis/public/gallery/publisher/{vendor}/extension/{name}/{version}/assetbyname/Microsoft.VisualStudio.Services.VSIXPackage",
                vendor = plugin.vendor(),
                name = plugin.name(),
                version = plugin.version(),
            ),
        }
    }
}

impl fmt::Display for MarketplaceVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OpenVsx => "openvsx",
            Self::VsCode => "vscode",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for MarketplaceVendor {
    type Err = EnvGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openvsx" | "open-vsx" => Ok(Self::OpenVsx),
            "vscode" | "microsoft" => Ok(Self::VsCode),
            other => Err(EnvGraphError::ConfigInvalid {
                path: "marketplace.vendor".into(),
                reason: format!("unknown marketplace vendor '{}'", other),
            }),
        }
    }
}

/// Downloads and unpacks plugins
#[async_trait]
pub trait PluginFetcher: Send + Sync {
    /// Unpack `plugin` somewhere under `staging` and return the extension directory
    async fn fetch(&self, plugin: &PluginRef, staging: &Path) -> EnvGraphResult<PathBuf>;
}

/// Fetches VSIX packages over HTTPS
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    vendor: MarketplaceVendor,
}

impl HttpFetcher {
    pub fn new(vendor: MarketplaceVendor) -> Self {
        Self { vendor }
    }
}

#[async_trait]
impl PluginFetcher for HttpFetcher {
    async fn fetch(&self, plugin: &PluginRef, staging: &Path) -> EnvGraphResult<PathBuf> {
        let url = self.vendor.download_url(plugin);
        let archive = staging.join(format!("{}.vsix", plugin));

        debug!("Downloading {} from {}", plugin, url);
        download(url, archive.clone()).await?;

        let unpacked = staging.join("unpacked");
        unzip(&archive, &unpacked).await?;

        let extension = unpacked.join(VSIX_EXTENSION_DIR);
        if !extension.is_dir() {
            return Err(EnvGraphError::PluginExtract {
                archive,
                reason: format!("archive has no {}/ directory", VSIX_EXTENSION_DIR),
            });
        }

        Ok(extension)
    }
}

/// Stream a URL to a file on a blocking thread
async fn download(url: String, dest: PathBuf) -> EnvGraphResult<()> {
    tokio::task::spawn_blocking(move || -> EnvGraphResult<()> {
        let response = ureq::get(&url)
            .call()
            .map_err(|e| EnvGraphError::PluginDownload {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let mut reader = response.into_body().into_reader();
        let mut file = std::fs::File::create(&dest)
            .map_err(|e| EnvGraphError::io(format!("creating {}", dest.display()), e))?;

        std::io::copy(&mut reader, &mut file).map_err(|e| EnvGraphError::PluginDownload {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        Ok(())
    })
    .await
    .map_err(|e| EnvGraphError::Internal(format!("download task failed: {}", e)))?
}

async fn unzip(archive: &Path, dest: &Path) -> EnvGraphResult<()> {
    let output = Command::new("unzip")
        .arg("-q")
        .arg("-o")
        .arg(archive)
        .arg("-d")
        .arg(dest)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| EnvGraphError::command_failed("unzip", e))?;

    if !output.status.success() {
        return Err(EnvGraphError::PluginExtract {
            archive: archive.to_path_buf(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}
