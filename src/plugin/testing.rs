//! Test doubles for the plugin cache and progress sink

use crate::error::{EnvGraphError, EnvGraphResult};
use crate::plugin::{CachedPlugin, PluginCache, PluginPhase, ProgressSink};
use crate::spec::PluginRef;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

/// In-memory cache that records every fetch
#[derive(Default)]
pub struct FakeCache {
    cached: HashSet<String>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl FakeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cached(mut self, plugin: &str) -> Self {
        self.cached.insert(plugin.to_string());
        self
    }

    pub fn with_failure(mut self, plugin: &str) -> Self {
        self.failing.insert(plugin.to_string());
        self
    }

    pub fn with_delay(mut self, plugin: &str, delay: Duration) -> Self {
        self.delays.insert(plugin.to_string(), delay);
        self
    }

    pub fn path_for(&self, plugin: &PluginRef) -> PathBuf {
        PathBuf::from("/cache").join(plugin.to_string()).join("extension")
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PluginCache for FakeCache {
    async fn download_or_cache(&self, plugin: &PluginRef) -> EnvGraphResult<CachedPlugin> {
        let key = plugin.to_string();
        self.calls.lock().unwrap().push(key.clone());

        if let Some(delay) = self.delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }

        if self.failing.contains(&key) {
            return Err(EnvGraphError::PluginDownload {
                url: format!("https://example.invalid/{key}.vsix"),
                reason: "connection refused".to_string(),
            });
        }

        Ok(CachedPlugin {
            path: self.path_for(plugin),
            cached: self.cached.contains(&key),
        })
    }
}

/// Progress sink that keeps every event
#[derive(Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<(String, PluginPhase, bool)>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<(String, PluginPhase, bool)> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingProgress {
    fn log_plugin_event(&self, plugin: &PluginRef, phase: PluginPhase, cached: bool) {
        self.events
            .lock()
            .unwrap()
            .push((plugin.to_string(), phase, cached));
    }
}
