//! UI module for a consistent CLI experience
//!
//! Uses `cliclack` and `indicatif` in interactive terminals with automatic
//! fallback to plain output in CI/non-interactive environments.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{key_value, plan_lines, print_plan, section, step_ok_detail, step_warn_hint};
pub use progress::PluginProgress;
