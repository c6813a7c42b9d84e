//! Resource configuration.
//!
//! Every resource lives in its own working directory containing a
//! `config.yaml` and a `source/` directory with exactly one input file.
//! A shared configuration file named by the `RELTAB_CONFIG` environment
//! variable can provide defaults; the resource configuration is merged
//! over it, nested mappings merging recursively and resource values
//! winning.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::directive::FieldDirective;
use crate::error::Result;
use crate::field::FieldType;

/// A label that is either shared across languages or given per language
/// code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MultiLang {
    Single(String),
    ByLanguage(BTreeMap<String, String>),
}

/// Preset for a field known to the wider installation (display label,
/// fixed type). Checked against the inferred schema by the manifest
/// module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfiguredField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub collection: bool,
    pub label: MultiLang,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportConfig {
    /// Raw field directives, parsed on demand.
    #[serde(default)]
    pub fields: Vec<String>,
}

impl ExportConfig {
    pub fn parsed_fields(&self) -> Result<Vec<FieldDirective>> {
        self.fields.iter().map(|raw| FieldDirective::parse(raw)).collect()
    }
}

/// Cast applied to a CSV/TSV column while reading, since those sources
/// carry no type information of their own.
#[derive(Debug, Clone, Deserialize)]
pub struct CastField {
    pub name: String,
    #[serde(rename = "type")]
    pub cast: CastKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CastKind {
    Int,
    Float,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CsvImportConfig {
    #[serde(default)]
    pub cast_fields: Vec<CastField>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportConfig {
    #[serde(default)]
    pub csv: CsvImportConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataConfig {
    /// URL template for the metadata API; `{resource_id}` is substituted.
    /// When unset the metadata module records an empty metadata map.
    #[serde(default)]
    pub url: Option<String>,
}

fn default_varchar_cutoff() -> u64 {
    191
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationalConfig {
    /// Text fields at or below this observed length become indexed
    /// `VARCHAR(n)` columns; longer ones become unindexed `TEXT`.
    #[serde(default = "default_varchar_cutoff")]
    pub varchar_cutoff: u64,
}

impl Default for RelationalConfig {
    fn default() -> Self {
        Self {
            varchar_cutoff: default_varchar_cutoff(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    pub resource_id: String,
    #[serde(default)]
    pub name: Option<MultiLang>,
    #[serde(default)]
    pub description: Option<MultiLang>,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default, rename = "import")]
    pub import_settings: ImportConfig,
    /// Field presets, merged with the inferred schema by the manifest
    /// module.
    #[serde(default)]
    pub fields: Vec<ConfiguredField>,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub relational: RelationalConfig,
    #[serde(skip)]
    pub workdir: PathBuf,
}

impl PipelineConfig {
    pub fn source_dir(&self) -> PathBuf {
        self.workdir.join("source")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.workdir.join("output")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.workdir.join("log")
    }

    pub fn create_output_dir(&self) -> Result<PathBuf> {
        let path = self.output_dir();
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    pub fn create_log_dir(&self) -> Result<PathBuf> {
        let path = self.log_dir();
        fs::create_dir_all(&path)?;
        Ok(path)
    }
}

/// Load the resource configuration from `<workdir>/config.yaml`, merged
/// over the optional shared configuration at `shared_path`.
pub fn load_config(workdir: &Path, shared_path: Option<&Path>) -> Result<PipelineConfig> {
    let mut merged = match shared_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "reading shared config");
            read_yaml(path)?
        }
        None => serde_yaml::Value::Mapping(serde_yaml::Mapping::new()),
    };
    let resource = read_yaml(&workdir.join("config.yaml"))?;
    merge_values(&mut merged, resource);
    let mut config: PipelineConfig = serde_yaml::from_value(merged)?;
    config.workdir = workdir.to_path_buf();
    Ok(config)
}

fn read_yaml(path: &Path) -> Result<serde_yaml::Value> {
    let text = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&text)?)
}

/// Merge `child` over `parent`. Mappings merge recursively, null child
/// values are ignored, everything else is replaced by the child value.
fn merge_values(parent: &mut serde_yaml::Value, child: serde_yaml::Value) {
    match (parent, child) {
        (serde_yaml::Value::Mapping(parent_map), serde_yaml::Value::Mapping(child_map)) => {
            for (key, value) in child_map {
                if value.is_null() {
                    continue;
                }
                match parent_map.get_mut(&key) {
                    Some(slot) => merge_values(slot, value),
                    None => {
                        parent_map.insert(key, value);
                    }
                }
            }
        }
        (parent, child) => {
            if !child.is_null() {
                *parent = child;
            }
        }
    }
}
