//! envgraph - Development environment build graph compiler
//!
//! Compiles a declarative environment spec (editor plugins, notebook and
//! IDE services, language runtime) into a layered build graph and the
//! commands that start the requested services.

pub mod cli;
pub mod compiler;
pub mod config;
pub mod error;
pub mod graph;
pub mod plugin;
pub mod service;
pub mod spec;
pub mod ui;

pub use compiler::{CompiledPlan, GraphCompiler};
pub use error::{EnvGraphError, EnvGraphResult};
