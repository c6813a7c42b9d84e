//! Manifest module.
//!
//! Writes `output/<resource_id>_manifest.yaml` describing the resource
//! for the surrounding installation: display name (from the metadata
//! artifact, falling back to the configuration), record count, source
//! field order and the full field list. Field presets from the
//! configuration are merged in; a preset whose shape disagrees with the
//! inferred schema is a configuration error.

use std::fs;

use anyhow::{Context, bail};
use serde::Serialize;

use reltab_model::{MultiLang, FieldType, PipelineConfig, Schema};

use crate::module::{Artifact, ArtifactMap, ModuleSpec, Task};

pub const SPEC: ModuleSpec = ModuleSpec {
    name: "manifest",
    dependencies: &["metadata", "schema", "dump"],
    export,
    load: None,
};

#[derive(Debug, Serialize)]
struct Manifest {
    resource_id: String,
    name: MultiLang,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<MultiLang>,
    size: u64,
    source_order: Vec<String>,
    fields: Vec<ManifestField>,
}

#[derive(Debug, Serialize)]
struct ManifestField {
    name: String,
    #[serde(rename = "type")]
    field_type: FieldType,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    collection: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<MultiLang>,
}

fn export(config: &PipelineConfig, artifacts: &ArtifactMap) -> anyhow::Result<Vec<Task>> {
    let schema_artifact = artifacts
        .get("schema")
        .and_then(Artifact::as_schema)
        .context("manifest: schema artifact missing")?;
    let metadata = artifacts
        .get("metadata")
        .and_then(Artifact::as_metadata)
        .context("manifest: metadata artifact missing")?;

    let name = metadata
        .get("name")
        .and_then(|value| serde_json::from_value::<MultiLang>(value.clone()).ok())
        .or_else(|| config.name.clone())
        .context("manifest: 'name' missing")?;

    let manifest = Manifest {
        resource_id: config.resource_id.clone(),
        name,
        description: config.description.clone(),
        size: schema_artifact.size,
        source_order: schema_artifact.source_order.clone(),
        fields: merge_configured_fields(config, &schema_artifact.entry_schema)?,
    };

    let dir = config.create_output_dir()?;
    fs::write(
        dir.join(format!("{}_manifest.yaml", config.resource_id)),
        serde_yaml::to_string(&manifest)?,
    )?;
    Ok(Vec::new())
}

/// Merge configured field presets with the inferred schema. A preset is
/// used verbatim when its shape matches; a shape conflict must be fixed
/// by renaming or aliasing in the configuration.
fn merge_configured_fields(
    config: &PipelineConfig,
    schema: &Schema,
) -> anyhow::Result<Vec<ManifestField>> {
    let mut fields = Vec::new();
    for field in schema.iter() {
        let preset = config
            .fields
            .iter()
            .find(|configured| configured.name == field.name);
        match preset {
            Some(configured) => {
                if configured.collection != field.collection
                    || configured.field_type != field.field_type
                {
                    bail!(
                        "{} is configured, but it is not the same as in this resource, \
                         must rename or add alias",
                        field.name
                    );
                }
                fields.push(ManifestField {
                    name: field.name.clone(),
                    field_type: configured.field_type,
                    collection: configured.collection,
                    label: Some(configured.label.clone()),
                });
            }
            None => fields.push(ManifestField {
                name: field.name.clone(),
                field_type: field.field_type,
                collection: field.collection,
                label: None,
            }),
        }
    }
    Ok(fields)
}
