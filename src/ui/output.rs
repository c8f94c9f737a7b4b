//! Output functions for consistent CLI formatting

use super::context::UiContext;
use crate::compiler::CompiledPlan;
use crate::graph::{BuildBackend, CopyLayer};
use console::style;

/// Display a section header
pub fn section(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::info(style(title).bold()).ok();
    } else {
        println!("{}", style(title).bold());
    }
}

/// Display a success step with detail
pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::success(format!("{} ({})", message, style(detail).dim())).ok();
    } else {
        println!("  {} {} ({})", style("[OK]").green(), message, detail);
    }
}

/// Display a warning step with hint
pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::warning(format!("{} - {}", message, style(hint).dim())).ok();
    } else {
        println!("  {} {} - {}", style("[WARN]").yellow(), message, hint);
    }
}

/// Print styled key-value pair
pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}

/// Print a compiled plan as an indented tree
pub fn print_plan(ctx: &UiContext, plan: &CompiledPlan) {
    section(ctx, "Build plan");
    for line in plan_lines(plan) {
        println!("  {}", line);
    }
    println!();
    key_value(ctx, "digest", &plan.digest());
}

/// Plain-text rendering of a plan, one entry per line
pub fn plan_lines(plan: &CompiledPlan) -> Vec<String> {
    let mut lines = Vec::new();

    match &plan.plugin_layer {
        Some(layer) => {
            lines.push("plugins:".to_string());
            lines.extend(layer.realize(&TreeRenderer).into_iter().map(|l| format!("  {}", l)));
        }
        None => lines.push("plugins: none".to_string()),
    }

    for (name, command) in [
        ("jupyter", &plan.jupyter_command),
        ("rstudio", &plan.rstudio_command),
    ] {
        match command {
            Some(command) => lines.push(format!("{}: {}", name, command)),
            None => lines.push(format!("{}: not requested", name)),
        }
    }

    lines
}

/// Renders a layer graph as indented lines
struct TreeRenderer;

impl BuildBackend for TreeRenderer {
    type State = Vec<String>;

    fn copy(&self, op: &CopyLayer) -> Vec<String> {
        vec![format!(
            "copy {} -> {} ({}:{})",
            op.source().display(),
            op.dest(),
            op.owner().uid,
            op.owner().gid
        )]
    }

    fn merge(&self, inputs: Vec<Vec<String>>, label: &str) -> Vec<String> {
        let mut lines = vec![format!("merge \"{}\"", label)];
        for line in inputs.into_iter().flatten() {
            lines.push(format!("  {}", line));
        }
        lines
    }
}
