//! Layer merging

use crate::graph::layer::{BuildLayer, MergeLayer};
use std::collections::HashSet;
use tracing::debug;

/// Label attached to the merged plugin layer
pub const PLUGIN_MERGE_LABEL: &str = "merging plugins for vscode";

/// Combine layers into one.
///
/// Returns `None` for no layers so callers can skip the feature, passes a
/// single layer through unchanged, and otherwise builds one merge node in
/// input order. A layer whose destinations were all written by an earlier
/// layer is dropped, so each destination is copied once.
pub fn merge(layers: Vec<BuildLayer>, label: &str) -> Option<BuildLayer> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut inputs = Vec::with_capacity(layers.len());

    for layer in layers {
        let dests = layer.destinations();
        if !dests.is_empty() && dests.iter().all(|d| seen.contains(*d)) {
            debug!("Skipping duplicate layer: {}", layer.label());
            continue;
        }
        seen.extend(dests.into_iter().map(String::from));
        inputs.push(layer);
    }

    match inputs.len() {
        0 => None,
        1 => inputs.pop(),
        _ => Some(BuildLayer::Merge(MergeLayer::new(inputs, label.to_string()))),
    }
}
