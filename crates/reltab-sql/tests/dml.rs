//! DML writer tests.

use reltab_model::{
    Entry, FieldDescriptor, FieldExtra, FieldType, PipelineError, RelationalConfig, Schema,
};
use reltab_sql::{SqlWriter, TableLayout};

fn text_field(name: &str, length: u64) -> FieldDescriptor {
    let mut field = FieldDescriptor::new(name, FieldType::Text);
    field.extra = FieldExtra {
        length: Some(length),
    };
    field
}

fn entry(json: serde_json::Value) -> Entry {
    json.as_object().unwrap().clone()
}

fn writer_for(schema: &Schema) -> SqlWriter<Vec<u8>> {
    let layout = TableLayout::new("lexicon", schema, &RelationalConfig::default()).unwrap();
    SqlWriter::new(layout, Vec::new())
}

fn written(writer: SqlWriter<Vec<u8>>) -> String {
    String::from_utf8(writer.into_inner()).unwrap()
}

#[test]
fn collection_elements_become_child_inserts_with_parent_ids() {
    let mut schema = Schema::new();
    schema.insert(text_field("word", 10));
    let mut tags = text_field("tags", 1);
    tags.collection = true;
    schema.insert(tags);

    let mut writer = writer_for(&schema);
    writer
        .write_entry(&entry(serde_json::json!({"word": "hem", "tags": ["x", "y"]})))
        .unwrap();
    writer
        .write_entry(&entry(serde_json::json!({"word": "hus", "tags": []})))
        .unwrap();

    assert_eq!(
        written(writer),
        "INSERT INTO lexicon (__id, word) VALUES (1, 'hem');\n\
         INSERT INTO lexicon__tags (__parent_id, value) VALUES (1, 'x');\n\
         INSERT INTO lexicon__tags (__parent_id, value) VALUES (1, 'y');\n\
         INSERT INTO lexicon (__id, word) VALUES (2, 'hus');\n"
    );
}

#[test]
fn null_and_absent_scalars_are_omitted() {
    let mut schema = Schema::new();
    schema.insert(text_field("word", 10));
    schema.insert(FieldDescriptor::new("page", FieldType::Integer));

    let mut writer = writer_for(&schema);
    writer
        .write_entry(&entry(serde_json::json!({"word": "hem", "page": null})))
        .unwrap();
    writer
        .write_entry(&entry(serde_json::json!({"page": 3})))
        .unwrap();

    assert_eq!(
        written(writer),
        "INSERT INTO lexicon (__id, word) VALUES (1, 'hem');\n\
         INSERT INTO lexicon (__id, page) VALUES (2, 3);\n"
    );
}

#[test]
fn strings_are_escaped() {
    let mut schema = Schema::new();
    schema.insert(text_field("gloss", 50));

    let mut writer = writer_for(&schema);
    writer
        .write_entry(&entry(serde_json::json!({"gloss": "it's a\ntest\\case"})))
        .unwrap();

    assert_eq!(
        written(writer),
        "INSERT INTO lexicon (__id, gloss) VALUES (1, 'it\\'s a\\ntest\\\\case');\n"
    );
}

#[test]
fn numbers_and_bools_render_as_literals() {
    let mut schema = Schema::new();
    schema.insert(FieldDescriptor::new("page", FieldType::Integer));
    schema.insert(FieldDescriptor::new("weight", FieldType::Float));
    schema.insert(FieldDescriptor::new("archived", FieldType::Bool));

    let mut writer = writer_for(&schema);
    writer
        .write_entry(&entry(
            serde_json::json!({"page": 12, "weight": 2.5, "archived": true}),
        ))
        .unwrap();

    assert_eq!(
        written(writer),
        "INSERT INTO lexicon (__id, page, weight, archived) VALUES (1, 12, 2.5, TRUE);\n"
    );
}

#[test]
fn table_rows_fan_out_into_child_columns() {
    let mut schema = Schema::new();
    let mut senses = FieldDescriptor::table("senses", true);
    let sub = senses.fields.as_mut().unwrap();
    sub.insert(text_field("gloss", 40));
    sub.insert(FieldDescriptor::new("rank", FieldType::Integer));
    schema.insert(senses);

    let mut writer = writer_for(&schema);
    writer
        .write_entry(&entry(serde_json::json!({
            "senses": [
                {"gloss": "dwelling", "rank": 1},
                {"gloss": "home", "rank": null},
            ]
        })))
        .unwrap();

    assert_eq!(
        written(writer),
        "INSERT INTO lexicon (__id) VALUES (1);\n\
         INSERT INTO lexicon__senses (__parent_id, gloss, rank) VALUES (1, 'dwelling', 1);\n\
         INSERT INTO lexicon__senses (__parent_id, gloss) VALUES (1, 'home');\n"
    );
}

#[test]
fn unsupported_value_kind_is_fatal() {
    let mut schema = Schema::new();
    let mut tags = text_field("tags", 1);
    tags.collection = true;
    schema.insert(tags);

    let mut writer = writer_for(&schema);
    let result = writer.write_entry(&entry(serde_json::json!({"tags": "not-a-list"})));
    assert!(matches!(
        result,
        Err(PipelineError::UnsupportedValue { column }) if column == "tags"
    ));
}
