//! Metadata module.
//!
//! Fetches the resource's metadata from the configured API endpoint and
//! persists it for later pipeline runs. Server-managed keys are pruned
//! so the result is usable as a metadata *file*. Without a configured
//! URL an empty metadata map is recorded, so offline runs still work.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use tracing::{info, warn};

use reltab_model::{Entry, PipelineConfig, Value};

use crate::module::{Artifact, ArtifactMap, ModuleSpec, Task};

pub const SPEC: ModuleSpec = ModuleSpec {
    name: "metadata",
    dependencies: &[],
    export,
    load: Some(load),
};

fn export(config: &PipelineConfig, _artifacts: &ArtifactMap) -> anyhow::Result<Vec<Task>> {
    let metadata = match &config.metadata.url {
        Some(url) => fetch_metadata(url, &config.resource_id)?,
        None => {
            warn!("metadata: no url configured, recording empty metadata");
            Entry::new()
        }
    };
    let path = data_path(config);
    fs::create_dir_all(path.parent().context("metadata path has no parent")?)?;
    fs::write(&path, serde_json::to_string_pretty(&metadata)?)?;
    Ok(Vec::new())
}

fn load(config: &PipelineConfig) -> anyhow::Result<Artifact> {
    let path = data_path(config);
    let text = fs::read_to_string(&path)
        .with_context(|| format!("reading metadata artifact {}", path.display()))?;
    Ok(Artifact::Metadata(serde_json::from_str(&text)?))
}

fn data_path(config: &PipelineConfig) -> PathBuf {
    config.output_dir().join("metadata").join("metadata.json")
}

fn fetch_metadata(url_template: &str, resource_id: &str) -> anyhow::Result<Entry> {
    let url = url_template.replace("{resource_id}", resource_id);
    info!(%url, "fetching resource metadata");
    let body = reqwest::blocking::get(&url)
        .and_then(reqwest::blocking::Response::error_for_status)
        .with_context(|| format!("calling metadata API on {url}"))?
        .text()
        .with_context(|| format!("reading metadata API response from {url}"))?;
    // an empty or non-JSON body is treated as no metadata
    let Ok(mut metadata) = serde_json::from_str::<Entry>(&body) else {
        return Ok(Entry::new());
    };
    prune_metadata(&mut metadata);
    Ok(metadata)
}

/// Remove the keys the API maintains itself and flatten languages to
/// their codes.
fn prune_metadata(metadata: &mut Entry) {
    metadata.remove("has_description");
    metadata.remove("id");
    if let Some(Value::Array(downloads)) = metadata.get_mut("downloads") {
        for download in downloads {
            if let Value::Object(download) = download {
                download.remove("last-modified");
                download.remove("size");
            }
        }
    }
    if let Some(Value::Array(languages)) = metadata.remove("languages") {
        let codes: Vec<Value> = languages
            .iter()
            .filter_map(|language| language.get("code").cloned())
            .collect();
        metadata.insert("language_codes".to_string(), Value::Array(codes));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prunes_server_managed_keys() {
        let mut metadata = serde_json::json!({
            "name": {"swe": "Ordlista", "eng": "Word list"},
            "has_description": true,
            "id": 17,
            "downloads": [
                {"url": "http://example.org/x", "last-modified": "2024-01-01", "size": 12}
            ],
            "languages": [{"code": "swe", "name": "Swedish"}],
        })
        .as_object()
        .unwrap()
        .clone();

        prune_metadata(&mut metadata);

        assert!(!metadata.contains_key("has_description"));
        assert!(!metadata.contains_key("id"));
        assert!(!metadata.contains_key("languages"));
        assert_eq!(
            metadata.get("language_codes"),
            Some(&serde_json::json!(["swe"]))
        );
        assert_eq!(
            metadata.get("downloads"),
            Some(&serde_json::json!([{"url": "http://example.org/x"}]))
        );
    }

    #[test]
    fn export_without_url_records_empty_metadata_and_load_reads_it_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.yaml"), "resource_id: testres\n").unwrap();
        let config = reltab_model::load_config(dir.path(), None).unwrap();

        let tasks = export(&config, &ArtifactMap::new()).unwrap();
        assert!(tasks.is_empty());

        let artifact = load(&config).unwrap();
        let metadata = artifact.as_metadata().unwrap();
        assert!(metadata.is_empty());
    }
}
