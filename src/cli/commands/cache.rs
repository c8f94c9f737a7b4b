//! Cache command - inspect and clear the plugin cache

use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::{Config, ConfigManager};
use crate::error::EnvGraphResult;
use crate::plugin::cache::CacheEntry;
use crate::plugin::{DiskPluginCache, MarketplaceVendor};
use crate::ui::{self, UiContext};
use console::style;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> EnvGraphResult<()> {
    let vendor: MarketplaceVendor = config.marketplace.vendor.parse()?;
    let cache = DiskPluginCache::offline(ConfigManager::cache_dir(config), vendor);

    match args.action {
        CacheAction::List { format } => list_plugins(&cache, format).await,
        CacheAction::Path => {
            println!("{}", cache.root().display());
            Ok(())
        }
        CacheAction::Clear => clear_cache(&cache).await,
    }
}

async fn list_plugins(cache: &DiskPluginCache, format: OutputFormat) -> EnvGraphResult<()> {
    let entries = cache.list().await?;

    match format {
        OutputFormat::Json => print_json(&entries)?,
        OutputFormat::Text => print_table(&entries),
    }

    Ok(())
}

fn print_table(entries: &[CacheEntry]) {
    if entries.is_empty() {
        println!("No cached plugins found.");
        return;
    }

    println!("{:<10} {:<50}", "VENDOR", "PLUGIN");
    println!("{}", "-".repeat(60));
    for entry in entries {
        println!("{:<10} {:<50}", style(&entry.vendor).dim(), entry.plugin);
    }
    println!();
    println!("Total: {} plugin(s)", entries.len());
}

fn print_json(entries: &[CacheEntry]) -> EnvGraphResult<()> {
    #[derive(serde::Serialize)]
    struct EntryJson<'a> {
        vendor: &'a str,
        plugin: &'a str,
        path: String,
    }

    let json: Vec<EntryJson> = entries
        .iter()
        .map(|e| EntryJson {
            vendor: &e.vendor,
            plugin: &e.plugin,
            path: e.path.display().to_string(),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

async fn clear_cache(cache: &DiskPluginCache) -> EnvGraphResult<()> {
    let ctx = UiContext::detect();
    let count = cache.list().await?.len();

    cache.clear().await?;
    ui::step_ok_detail(
        &ctx,
        "Plugin cache cleared",
        &format!("{} plugin(s) removed", count),
    );
    Ok(())
}
