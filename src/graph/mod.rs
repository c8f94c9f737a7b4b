//! Build graph
//!
//! Plugins are installed as one copy layer each and merged into a single
//! layer for the build executor.

pub mod layer;
pub mod merge;
pub mod synthesize;

pub use layer::{BuildBackend, BuildLayer, CopyLayer, MergeLayer};
pub use merge::{merge, PLUGIN_MERGE_LABEL};
pub use synthesize::{plugin_destination, synthesize};
