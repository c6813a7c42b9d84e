//! Module descriptors, tasks and artifacts.
//!
//! A module is a named unit of the pipeline. Its one-time `export` step
//! runs in dependency order and returns zero or more per-record tasks;
//! modules whose output is reusable by later pipeline runs also expose a
//! `load` step that re-reads the persisted artifact. The registry is a
//! static table populated at compile time, so resolving a module name is
//! an ordinary lookup with a clear "not found" failure.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use reltab_model::{Entry, PipelineConfig, Schema};

use crate::modules;

/// One per-record transformation in the task chain. Tasks may own open
/// output files and running counters; the chain is driven strictly
/// sequentially, and `finish` closes things down deterministically at
/// the end of the run.
pub trait EntryTask {
    fn name(&self) -> &'static str;

    /// Transform one entry. The returned entry is what every later task
    /// in the chain observes.
    fn run(&mut self, entry: Entry) -> anyhow::Result<Entry>;

    fn finish(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

pub type Task = Box<dyn EntryTask>;

/// The schema module's persisted output, shared by every module that
/// needs the inferred shape, the field order or the resource size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaArtifact {
    pub entry_schema: Schema,
    pub source_order: Vec<String>,
    pub size: u64,
}

/// A module's reusable output, keyed by module name in the artifact map.
/// Modules without a `load` step are represented by an empty placeholder.
#[derive(Debug, Clone)]
pub enum Artifact {
    Schema(SchemaArtifact),
    Metadata(Entry),
    Empty,
}

impl Artifact {
    pub fn as_schema(&self) -> Option<&SchemaArtifact> {
        match self {
            Artifact::Schema(artifact) => Some(artifact),
            _ => None,
        }
    }

    pub fn as_metadata(&self) -> Option<&Entry> {
        match self {
            Artifact::Metadata(metadata) => Some(metadata),
            _ => None,
        }
    }
}

pub type ArtifactMap = BTreeMap<String, Artifact>;

/// Registry entry for one module.
#[derive(Debug)]
pub struct ModuleSpec {
    pub name: &'static str,
    pub dependencies: &'static [&'static str],
    pub export: fn(&PipelineConfig, &ArtifactMap) -> anyhow::Result<Vec<Task>>,
    pub load: Option<fn(&PipelineConfig) -> anyhow::Result<Artifact>>,
}

static REGISTRY: &[ModuleSpec] = &[
    modules::metadata::SPEC,
    modules::schema::SPEC,
    modules::dump::SPEC,
    modules::relational::SPEC,
    modules::manifest::SPEC,
];

/// Modules executed by a plain `run` with no module arguments.
pub const DEFAULT_MODULES: &[&str] = &["metadata", "schema", "dump", "relational", "manifest"];

pub fn registry() -> &'static [ModuleSpec] {
    REGISTRY
}

pub fn find(name: &str) -> Option<&'static ModuleSpec> {
    REGISTRY.iter().find(|module| module.name == name)
}
