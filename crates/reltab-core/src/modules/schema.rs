//! Schema module.
//!
//! Reads the source once, infers the entry schema, source order and
//! size, reshapes the schema through the export field directives and
//! persists the result for every module that depends on it. The
//! returned task applies the per-record field conversions.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use reltab_ingest::SourceReader;
use reltab_model::PipelineConfig;

use crate::convert::build_entry_converter;
use crate::infer::infer_schema;
use crate::module::{Artifact, ArtifactMap, ModuleSpec, SchemaArtifact, Task};

pub const SPEC: ModuleSpec = ModuleSpec {
    name: "schema",
    dependencies: &[],
    export,
    load: Some(load),
};

fn export(config: &PipelineConfig, _artifacts: &ArtifactMap) -> anyhow::Result<Vec<Task>> {
    let mut reader = SourceReader::open(config)?;
    // inference exhausts the reader, which is what makes the source
    // order and size below valid
    let mut entry_schema = infer_schema(&mut reader)?;
    let source_order = reader.source_order().to_vec();
    let size = reader.size();

    let converter = build_entry_converter(config, &mut entry_schema)?;
    info!(schema = %serde_json::to_string(&entry_schema)?, "using entry schema");

    let artifact = SchemaArtifact {
        entry_schema,
        source_order,
        size,
    };
    let path = data_path(config);
    fs::create_dir_all(path.parent().context("schema path has no parent")?)?;
    fs::write(&path, serde_json::to_string_pretty(&artifact)?)?;

    Ok(vec![Box::new(converter)])
}

fn load(config: &PipelineConfig) -> anyhow::Result<Artifact> {
    let path = data_path(config);
    let text = fs::read_to_string(&path)
        .with_context(|| format!("reading schema artifact {}", path.display()))?;
    Ok(Artifact::Schema(serde_json::from_str(&text)?))
}

fn data_path(config: &PipelineConfig) -> PathBuf {
    config.output_dir().join("schema").join("schema.json")
}
