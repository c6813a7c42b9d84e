//! End-to-end pipeline runs over a temporary working directory.

use std::fs;
use std::path::Path;

use reltab_core::runner;
use reltab_model::PipelineConfig;

fn write_workdir(dir: &Path, config_yaml: &str, source_name: &str, source: &str) -> PipelineConfig {
    fs::create_dir_all(dir.join("source")).unwrap();
    fs::write(dir.join("config.yaml"), config_yaml).unwrap();
    fs::write(dir.join("source").join(source_name), source).unwrap();
    reltab_model::load_config(dir, None).unwrap()
}

const CONFIG: &str = "resource_id: testres\nname: Test resource\n";

const SOURCE: &str = concat!(
    "{\"word\": \"hem\", \"page\": 1, \"tags\": [\"x\", \"y\"]}\n",
    "{\"word\": \"hus\", \"page\": 2, \"tags\": []}\n",
);

#[test]
fn default_run_produces_dump_sql_manifest_and_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_workdir(dir.path(), CONFIG, "data.jsonl", SOURCE);

    let report = runner::run(
        &config,
        &reltab_core::DEFAULT_MODULES
            .iter()
            .map(|name| (*name).to_string())
            .collect::<Vec<_>>(),
    )
    .unwrap();

    assert_eq!(report.records, 2);
    assert_eq!(
        report.modules,
        vec!["metadata", "schema", "dump", "relational", "manifest"]
    );
    assert_eq!(report.tasks, vec!["convert", "dump", "relational"]);

    let output = dir.path().join("output");
    assert!(output.join("metadata/metadata.json").is_file());
    assert!(output.join("schema/schema.json").is_file());

    let dump = fs::read_to_string(output.join("testres.jsonl")).unwrap();
    assert_eq!(
        dump,
        concat!(
            "{\"word\":\"hem\",\"page\":1,\"tags\":[\"x\",\"y\"]}\n",
            "{\"word\":\"hus\",\"page\":2,\"tags\":[]}\n",
        )
    );

    let sql = fs::read_to_string(output.join("testres.sql")).unwrap();
    assert!(sql.contains("DROP TABLE IF EXISTS testres__tags;"));
    assert!(sql.contains("DROP TABLE IF EXISTS testres;"));
    assert!(sql.contains("CREATE TABLE testres ("));
    assert!(sql.contains("CREATE TABLE testres__tags ("));
    assert!(sql.contains("INSERT INTO testres (__id, word, page) VALUES (1, 'hem', 1);"));
    assert!(sql.contains("INSERT INTO testres__tags (__parent_id, value) VALUES (1, 'x');"));
    assert!(sql.contains("INSERT INTO testres__tags (__parent_id, value) VALUES (1, 'y');"));
    assert!(sql.contains("INSERT INTO testres (__id, word, page) VALUES (2, 'hus', 2);"));

    let manifest = fs::read_to_string(output.join("testres_manifest.yaml")).unwrap();
    assert!(manifest.contains("resource_id: testres"));
    assert!(manifest.contains("name: Test resource"));
    assert!(manifest.contains("size: 2"));
    assert!(manifest.contains("- word"));
}

#[test]
fn rerunning_the_pipeline_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_workdir(dir.path(), CONFIG, "data.jsonl", SOURCE);
    let modules = vec!["dump".to_string(), "relational".to_string()];

    runner::run(&config, &modules).unwrap();
    let output = dir.path().join("output");
    let first_dump = fs::read_to_string(output.join("testres.jsonl")).unwrap();
    let first_sql = fs::read_to_string(output.join("testres.sql")).unwrap();
    let first_schema = fs::read_to_string(output.join("schema/schema.json")).unwrap();

    runner::run(&config, &modules).unwrap();
    assert_eq!(
        fs::read_to_string(output.join("testres.jsonl")).unwrap(),
        first_dump
    );
    assert_eq!(
        fs::read_to_string(output.join("testres.sql")).unwrap(),
        first_sql
    );
    assert_eq!(
        fs::read_to_string(output.join("schema/schema.json")).unwrap(),
        first_schema
    );
}

#[test]
fn directives_reshape_the_dump() {
    let dir = tempfile::tempdir().unwrap();
    let config_yaml = concat!(
        "resource_id: testres\n",
        "name: Test resource\n",
        "export:\n",
        "  fields:\n",
        "    - \"word as headword\"\n",
        "    - \"page:num.to_text as page_text\"\n",
    );
    let config = write_workdir(dir.path(), config_yaml, "data.jsonl", SOURCE);

    runner::run(&config, &["dump".to_string()]).unwrap();

    let dump = fs::read_to_string(dir.path().join("output/testres.jsonl")).unwrap();
    assert_eq!(
        dump,
        concat!(
            "{\"headword\":\"hem\",\"page_text\":\"1\"}\n",
            "{\"headword\":\"hus\",\"page_text\":\"2\"}\n",
        )
    );
}

#[test]
fn csv_source_flows_through_the_relational_projection() {
    let dir = tempfile::tempdir().unwrap();
    let config_yaml = concat!(
        "resource_id: pages\n",
        "import:\n",
        "  csv:\n",
        "    cast_fields:\n",
        "      - name: page\n",
        "        type: int\n",
    );
    let config = write_workdir(dir.path(), config_yaml, "data.csv", "word,page\nhem,12\n");

    runner::run(&config, &["relational".to_string()]).unwrap();

    let sql = fs::read_to_string(dir.path().join("output/pages.sql")).unwrap();
    assert!(sql.contains("page INT,"));
    assert!(sql.contains("INSERT INTO pages (__id, word, page) VALUES (1, 'hem', 12);"));
}

#[test]
fn shape_mismatch_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_workdir(
        dir.path(),
        CONFIG,
        "data.jsonl",
        "{\"a\": 1}\n{\"a\": \"x\"}\n",
    );

    let error = runner::run(&config, &["dump".to_string()]).unwrap_err();
    let message = format!("{error:#}");
    assert!(message.contains("row 2"), "unexpected error: {message}");
}

#[test]
fn unknown_module_is_fatal_before_any_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_workdir(dir.path(), CONFIG, "data.jsonl", SOURCE);

    let error = runner::run(&config, &["nonexistent".to_string()]).unwrap_err();
    assert!(format!("{error}").contains("module not found"));
    assert!(!dir.path().join("output").exists());
}
