//! Plugin progress with CI fallback

use super::context::UiContext;
use crate::plugin::{PluginPhase, ProgressSink};
use crate::spec::PluginRef;
use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Shows one spinner per plugin being fetched.
///
/// In non-interactive mode each event is a plain line on stderr.
pub struct PluginProgress {
    multi: Option<MultiProgress>,
    bars: Mutex<HashMap<PluginRef, ProgressBar>>,
}

impl PluginProgress {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            multi: ctx.use_fancy_output().then(MultiProgress::new),
            bars: Mutex::new(HashMap::new()),
        }
    }

    /// Stop spinners for plugins that never finished
    pub fn finish(&self) {
        let Ok(mut bars) = self.bars.lock() else {
            return;
        };
        for (plugin, bar) in bars.drain() {
            bar.abandon_with_message(format!("{} {}", style("✗").red(), plugin));
        }
    }

    fn spinner(multi: &MultiProgress, plugin: &PluginRef) -> ProgressBar {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.cyan} {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "),
        );
        bar.set_message(format!("Installing vscode plugin {}", plugin));
        bar.enable_steady_tick(Duration::from_millis(120));
        bar
    }
}

impl ProgressSink for PluginProgress {
    fn log_plugin_event(&self, plugin: &PluginRef, phase: PluginPhase, cached: bool) {
        let Ok(mut bars) = self.bars.lock() else {
            return;
        };

        match phase {
            PluginPhase::Start => match &self.multi {
                Some(multi) => {
                    bars.insert(plugin.clone(), Self::spinner(multi, plugin));
                }
                None => eprintln!("{} Installing vscode plugin {}", style("...").dim(), plugin),
            },
            PluginPhase::End => {
                let detail = if cached { "cached" } else { "downloaded" };
                match bars.remove(plugin) {
                    Some(bar) => bar.finish_with_message(format!(
                        "{} {} ({})",
                        style("✓").green(),
                        plugin,
                        style(detail).dim()
                    )),
                    None => eprintln!("{} {} ({})", style("[OK]").green(), plugin, detail),
                }
            }
        }
    }
}
