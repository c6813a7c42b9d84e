//! Entry converter tests.

use reltab_core::build_entry_converter;
use reltab_model::{
    Entry, FieldDescriptor, FieldType, PipelineConfig, PipelineError, Schema, Value,
};

fn config(yaml: &str) -> PipelineConfig {
    serde_yaml::from_str(yaml).unwrap()
}

fn config_with_fields(directives: &[&str]) -> PipelineConfig {
    let fields: Vec<String> = directives
        .iter()
        .map(|directive| format!("    - \"{directive}\"\n"))
        .collect();
    config(&format!(
        "resource_id: testres\nexport:\n  fields:\n{}",
        fields.join("")
    ))
}

fn entry(json: serde_json::Value) -> Entry {
    json.as_object().unwrap().clone()
}

fn sample_schema() -> Schema {
    let mut schema = Schema::new();
    schema.insert(FieldDescriptor::new("a", FieldType::Integer));
    let mut b = FieldDescriptor::new("b", FieldType::Text);
    b.note_text_length(4);
    schema.insert(b);
    schema
}

#[test]
fn empty_directives_keep_every_field() {
    let config = config("resource_id: testres\n");
    let mut schema = sample_schema();
    let converter = build_entry_converter(&config, &mut schema).unwrap();
    let names: Vec<_> = schema.names().collect();
    assert_eq!(names, vec!["a", "b"]);

    let out = converter
        .convert(&entry(serde_json::json!({"a": 1, "b": "text"})))
        .unwrap();
    assert_eq!(out.get("a"), Some(&Value::from(1)));
    assert_eq!(out.get("b"), Some(&Value::from("text")));
}

#[test]
fn exclude_drops_the_field_from_schema_and_entries() {
    let config = config_with_fields(&["not b"]);
    let mut schema = sample_schema();
    let converter = build_entry_converter(&config, &mut schema).unwrap();
    let names: Vec<_> = schema.names().collect();
    assert_eq!(names, vec!["a"]);

    let out = converter
        .convert(&entry(serde_json::json!({"a": 1, "b": "text"})))
        .unwrap();
    assert_eq!(out.get("a"), Some(&Value::from(1)));
    assert!(out.get("b").is_none());
}

#[test]
fn directives_without_wildcard_rebuild_the_schema() {
    let config = config_with_fields(&["a as x"]);
    let mut schema = sample_schema();
    let converter = build_entry_converter(&config, &mut schema).unwrap();
    let names: Vec<_> = schema.names().collect();
    assert_eq!(names, vec!["x"]);
    assert_eq!(schema.get("x").unwrap().field_type, FieldType::Integer);

    let out = converter
        .convert(&entry(serde_json::json!({"a": 7, "b": "dropped"})))
        .unwrap();
    assert_eq!(out.get("x"), Some(&Value::from(7)));
    assert!(out.get("a").is_none());
    assert!(out.get("b").is_none());
}

#[test]
fn wildcard_keeps_fields_alongside_renames() {
    let config = config_with_fields(&["...", "a as x"]);
    let mut schema = sample_schema();
    let converter = build_entry_converter(&config, &mut schema).unwrap();
    let names: Vec<_> = schema.names().collect();
    assert_eq!(names, vec!["a", "b", "x"]);

    let out = converter
        .convert(&entry(serde_json::json!({"a": 7, "b": "kept"})))
        .unwrap();
    assert_eq!(out.get("a"), Some(&Value::from(7)));
    assert_eq!(out.get("b"), Some(&Value::from("kept")));
    assert_eq!(out.get("x"), Some(&Value::from(7)));
}

#[test]
fn absent_collection_values_become_empty_sequences() {
    let config = config("resource_id: testres\n");
    let mut schema = Schema::new();
    let mut tags = FieldDescriptor::new("tags", FieldType::Text);
    tags.collection = true;
    schema.insert(tags);
    let converter = build_entry_converter(&config, &mut schema).unwrap();

    let out = converter.convert(&entry(serde_json::json!({}))).unwrap();
    assert_eq!(out.get("tags"), Some(&Value::Array(Vec::new())));

    let out = converter
        .convert(&entry(serde_json::json!({"tags": null})))
        .unwrap();
    assert_eq!(out.get("tags"), Some(&Value::Array(Vec::new())));
}

#[test]
fn text_fields_are_sanitized() {
    let config = config("resource_id: testres\n");
    let mut schema = Schema::new();
    let mut gloss = FieldDescriptor::new("gloss", FieldType::Text);
    gloss.note_text_length(20);
    schema.insert(gloss);
    let mut tags = FieldDescriptor::new("tags", FieldType::Text);
    tags.collection = true;
    schema.insert(tags);
    let converter = build_entry_converter(&config, &mut schema).unwrap();

    let out = converter
        .convert(&entry(serde_json::json!({
            "gloss": "a\u{0007}b\u{00a0}c\nd",
            "tags": ["x\u{200b}y"],
        })))
        .unwrap();
    assert_eq!(out.get("gloss"), Some(&Value::from("ab c\nd")));
    assert_eq!(out.get("tags"), Some(&serde_json::json!(["xy"])));
}

#[test]
fn converter_directive_transforms_values_and_schema() {
    let config = config_with_fields(&["a:num.to_text as a_text"]);
    let mut schema = sample_schema();
    let converter = build_entry_converter(&config, &mut schema).unwrap();
    let field = schema.get("a_text").unwrap();
    assert_eq!(field.field_type, FieldType::Text);
    assert_eq!(field.extra.length, Some(24));

    let out = converter
        .convert(&entry(serde_json::json!({"a": 12, "b": "y"})))
        .unwrap();
    assert_eq!(out.get("a_text"), Some(&Value::from("12")));
}

#[test]
fn whole_entry_directive_serializes_the_record() {
    let config = config_with_fields(&["...", "*:entry.to_json as raw"]);
    let mut schema = sample_schema();
    let converter = build_entry_converter(&config, &mut schema).unwrap();
    assert_eq!(schema.get("raw").unwrap().field_type, FieldType::Text);

    let out = converter
        .convert(&entry(serde_json::json!({"a": 1, "b": "x"})))
        .unwrap();
    assert_eq!(out.get("raw"), Some(&Value::from("{\"a\":1,\"b\":\"x\"}")));
}

#[test]
fn unknown_converter_fails_at_build_time() {
    let config = config_with_fields(&["a:no.such"]);
    let mut schema = sample_schema();
    let error = build_entry_converter(&config, &mut schema).unwrap_err();
    assert!(matches!(error, PipelineError::UnknownConverter(name) if name == "no.such"));
}

#[test]
fn unknown_source_field_fails_at_build_time() {
    let config = config_with_fields(&["zzz"]);
    let mut schema = sample_schema();
    let error = build_entry_converter(&config, &mut schema).unwrap_err();
    assert!(matches!(error, PipelineError::UnknownField(name) if name == "zzz"));
}

#[test]
fn record_missing_a_renamed_field_reads_as_null() {
    let config = config_with_fields(&["a as x", "b"]);
    let mut schema = sample_schema();
    let converter = build_entry_converter(&config, &mut schema).unwrap();

    let out = converter
        .convert(&entry(serde_json::json!({"b": "only"})))
        .unwrap();
    assert_eq!(out.get("x"), Some(&Value::Null));
    assert_eq!(out.get("b"), Some(&Value::from("only")));
}

#[test]
fn conversion_is_deterministic_across_reruns() {
    let build = || {
        let config = config_with_fields(&["...", "not b", "a:num.to_text as a_text"]);
        let mut schema = sample_schema();
        let converter = build_entry_converter(&config, &mut schema).unwrap();
        (schema, converter)
    };
    let (schema_one, converter_one) = build();
    let (schema_two, converter_two) = build();
    assert_eq!(schema_one, schema_two);

    let record = entry(serde_json::json!({"a": 3, "b": "x"}));
    assert_eq!(
        converter_one.convert(&record).unwrap(),
        converter_two.convert(&record).unwrap()
    );
}
