//! Progress sink that forwards plugin events to `tracing`

use crate::plugin::{PluginPhase, ProgressSink};
use crate::spec::PluginRef;
use tracing::info;

/// Logs plugin events as structured `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn log_plugin_event(&self, plugin: &PluginRef, phase: PluginPhase, cached: bool) {
        match phase {
            PluginPhase::Start => info!(plugin = %plugin, "Installing vscode plugin"),
            PluginPhase::End => info!(plugin = %plugin, cached, "Installed vscode plugin"),
        }
    }
}
