//! Compile command - turn an environment spec into a build plan

use crate::cli::args::{CompileArgs, OutputFormat};
use crate::compiler::{CompiledPlan, GraphCompiler};
use crate::config::{Config, ConfigManager};
use crate::error::EnvGraphResult;
use crate::plugin::{
    DiskPluginCache, HttpFetcher, MarketplaceVendor, ProgressSink, ResolveOptions, TracingProgress,
};
use crate::spec::EnvironmentSpec;
use crate::ui::{self, PluginProgress, UiContext};
use serde::Serialize;
use tracing::debug;

/// Execute the compile command
pub async fn execute(args: CompileArgs, config: &Config) -> EnvGraphResult<()> {
    let ctx = match args.format {
        OutputFormat::Json => UiContext::non_interactive(),
        OutputFormat::Text => UiContext::detect(),
    };

    let mut spec = EnvironmentSpec::from_file(&args.spec, &config.build).await?;
    if let Some(dir) = args.working_dir {
        spec.working_dir = dir;
    }
    debug!(
        "Loaded spec {} ({} plugin(s), {} runtime)",
        args.spec.display(),
        spec.plugins.len(),
        spec.runtime.language
    );

    let cache = open_cache(config, args.offline)?;
    let concurrency = args.jobs.unwrap_or(config.marketplace.concurrency);

    // JSON output keeps stderr to tracing events only
    let progress = PluginProgress::new(&ctx);
    let sink: &dyn ProgressSink = match args.format {
        OutputFormat::Json => &TracingProgress,
        OutputFormat::Text => &progress,
    };
    let compiler = GraphCompiler::new(&cache, sink)
        .with_install_root(config.build.install_root.clone())
        .with_options(ResolveOptions { concurrency });

    let result = compiler.compile(&mut spec).await;
    progress.finish();
    let plan = result?;

    match args.format {
        OutputFormat::Json => print_json(&plan, &spec)?,
        OutputFormat::Text => {
            ui::print_plan(&ctx, &plan);
            ui::key_value(&ctx, "working dir", &spec.working_dir);
            if !spec.runtime.pypi.is_empty() {
                ui::key_value(&ctx, "pypi", &spec.runtime.pypi.join(" "));
            }
        }
    }

    Ok(())
}

fn open_cache(config: &Config, offline: bool) -> EnvGraphResult<DiskPluginCache> {
    let vendor: MarketplaceVendor = config.marketplace.vendor.parse()?;
    let root = ConfigManager::cache_dir(config);

    if offline || config.marketplace.offline {
        debug!("Plugin cache {} opened offline", root.display());
        Ok(DiskPluginCache::offline(root, vendor))
    } else {
        Ok(DiskPluginCache::new(
            root,
            vendor,
            Box::new(HttpFetcher::new(vendor)),
        ))
    }
}

fn print_json(plan: &CompiledPlan, spec: &EnvironmentSpec) -> EnvGraphResult<()> {
    #[derive(Serialize)]
    struct PlanJson<'a> {
        digest: String,
        working_dir: &'a str,
        pypi: &'a [String],
        #[serde(flatten)]
        plan: &'a CompiledPlan,
    }

    let output = PlanJson {
        digest: plan.digest(),
        working_dir: &spec.working_dir,
        pypi: &spec.runtime.pypi,
        plan,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
