//! Schema inference.
//!
//! One sequential pass over the source records builds the schema
//! field-by-field. The first concrete observation of a field fixes its
//! type and collection flag; every later observation must agree, except
//! that integer and float observations unify to float. Failures carry
//! the 1-based row they occurred on and abort the whole inference, no
//! partial schema is usable.

use tracing::debug;

use reltab_model::{
    Entry, FieldDescriptor, FieldType, PipelineError, Result, Schema, Value,
};

/// Consume all entries and return the inferred schema.
pub fn infer_schema<I>(entries: I) -> Result<Schema>
where
    I: IntoIterator<Item = Result<Entry>>,
{
    let mut schema = Schema::new();
    for (idx, entry) in entries.into_iter().enumerate() {
        let entry = entry?;
        for (key, value) in &entry {
            observe_field(&mut schema, key, value).map_err(|error| error.on_row(idx + 1))?;
        }
    }
    Ok(schema)
}

fn observe_field(schema: &mut Schema, key: &str, value: &Value) -> Result<()> {
    match value {
        // null defers creation of unseen fields and is ignored for known
        // ones
        Value::Null => Ok(()),
        Value::Array(items) => observe_values(schema, key, items, true),
        single => observe_values(schema, key, std::slice::from_ref(single), false),
    }
}

fn observe_values(schema: &mut Schema, key: &str, items: &[Value], collection: bool) -> Result<()> {
    if let Some(field) = schema.get(key)
        && field.collection != collection
    {
        return Err(PipelineError::CollectionMismatch {
            field: key.to_string(),
        });
    }
    for item in items {
        match item {
            Value::Null => {}
            Value::Array(_) => {
                return Err(PipelineError::NestingNotAllowed {
                    field: key.to_string(),
                });
            }
            Value::Object(row) => observe_table_row(schema, key, collection, row)?,
            scalar => {
                let observed = FieldType::of_scalar(scalar).ok_or_else(|| {
                    PipelineError::UnsupportedValue {
                        column: key.to_string(),
                    }
                })?;
                observe_scalar(schema, key, collection, observed, scalar)?;
            }
        }
    }
    Ok(())
}

fn observe_scalar(
    schema: &mut Schema,
    key: &str,
    collection: bool,
    observed: FieldType,
    scalar: &Value,
) -> Result<()> {
    match schema.get_mut(key) {
        Some(field) => {
            if field.field_type == FieldType::Integer && observed == FieldType::Float {
                // integers seen so far fit in the wider type
                field.field_type = FieldType::Float;
            } else if !field.field_type.accepts(observed) {
                return Err(PipelineError::TypeMismatch {
                    field: key.to_string(),
                    expected: field.field_type,
                    actual: observed,
                });
            }
            if field.field_type == FieldType::Text
                && let Value::String(text) = scalar
            {
                field.note_text_length(text.chars().count() as u64);
            }
        }
        None => {
            let mut field = FieldDescriptor::new(key, observed);
            field.collection = collection;
            if let Value::String(text) = scalar {
                field.note_text_length(text.chars().count() as u64);
            }
            debug!(field = %key, r#type = %field.field_type, collection, "adding field");
            schema.insert(field);
        }
    }
    Ok(())
}

fn observe_table_row(schema: &mut Schema, key: &str, collection: bool, row: &Entry) -> Result<()> {
    if !schema.contains(key) {
        debug!(field = %key, r#type = %FieldType::Table, collection, "adding field");
        schema.insert(FieldDescriptor::table(key, collection));
    }
    let field = match schema.get_mut(key) {
        Some(field) => field,
        None => return Ok(()),
    };
    if field.field_type != FieldType::Table {
        return Err(PipelineError::TypeMismatch {
            field: key.to_string(),
            expected: field.field_type,
            actual: FieldType::Table,
        });
    }
    let sub_schema = field.fields.get_or_insert_with(Schema::new);
    for (sub_key, sub_value) in row {
        match sub_value {
            Value::Null => {}
            // sub-fields must stay scalar, one nesting level only
            Value::Array(_) | Value::Object(_) => {
                return Err(PipelineError::NestingNotAllowed {
                    field: sub_key.to_string(),
                });
            }
            scalar => {
                let observed = FieldType::of_scalar(scalar).ok_or_else(|| {
                    PipelineError::UnsupportedValue {
                        column: sub_key.to_string(),
                    }
                })?;
                observe_scalar(sub_schema, sub_key, false, observed, scalar)?;
            }
        }
    }
    Ok(())
}
