//! Plugin layer synthesis
//!
//! Each resolved plugin becomes one copy layer from its cache path into
//! `<install root>/<install subpath>`, the subpath being whatever the cache
//! client reported (`vendor.name-version` by default).

use crate::graph::layer::{BuildLayer, CopyLayer};
use crate::plugin::ResolvedPlugin;
use crate::spec::Ownership;

/// Destination directory for a plugin under the install root
pub fn plugin_destination(install_root: &str, install_subpath: &str) -> String {
    format!("{}/{}", install_root.trim_end_matches('/'), install_subpath)
}

/// Turn one resolved plugin into a single copy layer
pub fn synthesize(resolved: &ResolvedPlugin, install_root: &str, owner: Ownership) -> BuildLayer {
    let canonical = resolved.plugin.to_string();

    BuildLayer::Copy(CopyLayer::new(
        resolved.source.clone(),
        plugin_destination(install_root, &resolved.install_subpath),
        owner,
        format!("install vscode plugin {}", canonical),
    ))
}
