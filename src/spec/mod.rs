//! Environment description
//!
//! An `EnvironmentSpec` lists the editor plugins to install, the optional
//! services to launch and the language runtime they run against.

pub mod environment;
pub mod plugin;
pub mod runtime;

pub use environment::{EnvironmentSpec, JupyterConfig, Ownership, RStudioConfig};
pub use plugin::PluginRef;
pub use runtime::{Language, LanguageRuntime, Service};
