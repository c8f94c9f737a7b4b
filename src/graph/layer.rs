//! Build layer DAG nodes
//!
//! A `BuildLayer` is an immutable filesystem state: either a single copy
//! operation or a labelled merge over an ordered list of layers. Layers are
//! created by the synthesizer and the merger and never edited afterwards.

use crate::spec::Ownership;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// A node in the build graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum BuildLayer {
    Copy(CopyLayer),
    Merge(MergeLayer),
}

/// Copy a local path into the image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyLayer {
    source: PathBuf,
    dest: String,
    create_dest_path: bool,
    owner: Ownership,
    label: String,
}

/// Union of several layers, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeLayer {
    inputs: Vec<BuildLayer>,
    label: String,
}

/// Executor that materializes a build graph.
///
/// `State` is the executor's own handle for a filesystem state.
pub trait BuildBackend {
    type State;

    /// Materialize a single copy operation
    fn copy(&self, op: &CopyLayer) -> Self::State;

    /// Combine already materialized states into one
    fn merge(&self, inputs: Vec<Self::State>, label: &str) -> Self::State;
}

impl CopyLayer {
    pub(crate) fn new(
        source: PathBuf,
        dest: String,
        owner: Ownership,
        label: String,
    ) -> Self {
        Self {
            source,
            dest,
            create_dest_path: true,
            owner,
            label,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn dest(&self) -> &str {
        &self.dest
    }

    pub fn create_dest_path(&self) -> bool {
        self.create_dest_path
    }

    pub fn owner(&self) -> Ownership {
        self.owner
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl MergeLayer {
    pub(crate) fn new(inputs: Vec<BuildLayer>, label: String) -> Self {
        Self { inputs, label }
    }

    pub fn inputs(&self) -> &[BuildLayer] {
        &self.inputs
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl BuildLayer {
    /// Human-readable label shown by the executor
    pub fn label(&self) -> &str {
        match self {
            Self::Copy(copy) => copy.label(),
            Self::Merge(merge) => merge.label(),
        }
    }

    /// All copy operations in the graph, depth-first in input order
    pub fn copies(&self) -> Vec<&CopyLayer> {
        let mut out = Vec::new();
        self.collect_copies(&mut out);
        out
    }

    fn collect_copies<'a>(&'a self, out: &mut Vec<&'a CopyLayer>) {
        match self {
            Self::Copy(copy) => out.push(copy),
            Self::Merge(merge) => {
                for input in &merge.inputs {
                    input.collect_copies(out);
                }
            }
        }
    }

    /// Destinations written by this layer
    pub fn destinations(&self) -> Vec<&str> {
        self.copies().into_iter().map(|c| c.dest()).collect()
    }

    /// Content-addressed key of the graph.
    ///
    /// Structurally identical graphs hash the same. Input order is part of
    /// the hash since it is part of the graph.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        self.hash_into(&mut hasher);
        hex::encode(hasher.finalize())
    }

    fn hash_into(&self, hasher: &mut Sha256) {
        match self {
            Self::Copy(copy) => {
                hasher.update(b"copy\0");
                hasher.update(copy.source.to_string_lossy().as_bytes());
                hasher.update(b"\0");
                hasher.update(copy.dest.as_bytes());
                hasher.update(b"\0");
                hasher.update([u8::from(copy.create_dest_path)]);
                hasher.update(copy.owner.uid.to_be_bytes());
                hasher.update(copy.owner.gid.to_be_bytes());
                hasher.update(copy.label.as_bytes());
                hasher.update(b"\0");
            }
            Self::Merge(merge) => {
                hasher.update(b"merge\0");
                hasher.update(merge.label.as_bytes());
                hasher.update(b"\0");
                hasher.update((merge.inputs.len() as u64).to_be_bytes());
                for input in &merge.inputs {
                    input.hash_into(hasher);
                }
            }
        }
    }

    /// Walk the graph bottom-up, handing each node to the executor
    pub fn realize<B: BuildBackend>(&self, backend: &B) -> B::State {
        match self {
            Self::Copy(copy) => backend.copy(copy),
            Self::Merge(merge) => {
                let inputs = merge.inputs.iter().map(|i| i.realize(backend)).collect();
                backend.merge(inputs, &merge.label)
            }
        }
    }
}
