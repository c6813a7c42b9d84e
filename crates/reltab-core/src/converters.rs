//! Converter registry.
//!
//! A converter is a named pair of functions: a value transform applied
//! per record and a schema update that computes the descriptor of the
//! target field. Converters are registered statically under
//! `<module>.<function>` names; resolution is an ordinary lookup with a
//! clear failure, never a dynamic import.

use reltab_model::{FieldDescriptor, FieldExtra, FieldType, PipelineError, Result, Value};

#[derive(Debug)]
pub struct Converter {
    pub name: &'static str,
    /// Compute the descriptor of the target field from the (renamed)
    /// source descriptor. The converter owns the emitted type and length.
    pub update_schema: fn(&FieldDescriptor) -> FieldDescriptor,
    /// Transform one value. Receives the resource id and, for `*`
    /// directives, the whole entry as an object value.
    pub convert: fn(&str, &Value) -> Result<Value>,
}

static CONVERTERS: &[Converter] = &[
    Converter {
        name: "text.lower",
        update_schema: lower_update_schema,
        convert: lower,
    },
    Converter {
        name: "num.to_text",
        update_schema: to_text_update_schema,
        convert: to_text,
    },
    Converter {
        name: "entry.to_json",
        update_schema: to_json_update_schema,
        convert: to_json,
    },
];

pub fn lookup(name: &str) -> Option<&'static Converter> {
    CONVERTERS.iter().find(|converter| converter.name == name)
}

fn lower_update_schema(field: &FieldDescriptor) -> FieldDescriptor {
    let mut updated = field.clone();
    updated.field_type = FieldType::Text;
    updated
}

fn lower(_resource_id: &str, value: &Value) -> Result<Value> {
    map_elements(value, "text.lower", &|element| match element {
        Value::String(text) => Ok(Value::String(text.to_lowercase())),
        other => Err(PipelineError::Message(format!(
            "text.lower expects text values, got {other}"
        ))),
    })
}

fn to_text_update_schema(field: &FieldDescriptor) -> FieldDescriptor {
    let mut updated = field.clone();
    updated.field_type = FieldType::Text;
    updated.extra = FieldExtra { length: Some(24) };
    updated
}

fn to_text(_resource_id: &str, value: &Value) -> Result<Value> {
    map_elements(value, "num.to_text", &|element| match element {
        Value::Number(number) => Ok(Value::String(number.to_string())),
        other => Err(PipelineError::Message(format!(
            "num.to_text expects numeric values, got {other}"
        ))),
    })
}

fn to_json_update_schema(field: &FieldDescriptor) -> FieldDescriptor {
    let mut updated = field.clone();
    updated.field_type = FieldType::Text;
    updated.collection = false;
    updated.fields = None;
    updated.extra = FieldExtra::default();
    updated
}

fn to_json(_resource_id: &str, value: &Value) -> Result<Value> {
    Ok(Value::String(serde_json::to_string(value)?))
}

/// Apply a scalar transform through a collection, or directly to a
/// single value. Nulls pass through untouched.
fn map_elements(
    value: &Value,
    name: &str,
    transform: &dyn Fn(&Value) -> Result<Value>,
) -> Result<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Array(items) => {
            let mapped = items
                .iter()
                .map(|item| match item {
                    Value::Null => Ok(Value::Null),
                    other => transform(other),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Array(mapped))
        }
        Value::Object(_) => Err(PipelineError::Message(format!(
            "{name} expects scalar values, got an object"
        ))),
        single => transform(single),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_registered_converters() {
        assert!(lookup("text.lower").is_some());
        assert!(lookup("num.to_text").is_some());
        assert!(lookup("entry.to_json").is_some());
        assert!(lookup("text.upper").is_none());
    }

    #[test]
    fn lower_applies_to_scalars_and_collections() {
        let converter = lookup("text.lower").unwrap();
        assert_eq!(
            (converter.convert)("res", &Value::from("HEM")).unwrap(),
            Value::from("hem")
        );
        assert_eq!(
            (converter.convert)("res", &serde_json::json!(["A", "b"])).unwrap(),
            serde_json::json!(["a", "b"])
        );
    }

    #[test]
    fn lower_rejects_numbers() {
        let converter = lookup("text.lower").unwrap();
        assert!((converter.convert)("res", &Value::from(3)).is_err());
    }

    #[test]
    fn to_text_stringifies_numbers_and_updates_schema() {
        let converter = lookup("num.to_text").unwrap();
        assert_eq!(
            (converter.convert)("res", &Value::from(12)).unwrap(),
            Value::from("12")
        );
        let field = FieldDescriptor::new("page", FieldType::Integer);
        let updated = (converter.update_schema)(&field);
        assert_eq!(updated.field_type, FieldType::Text);
        assert_eq!(updated.extra.length, Some(24));
    }

    #[test]
    fn to_json_serializes_whole_entries() {
        let converter = lookup("entry.to_json").unwrap();
        let value = serde_json::json!({"word": "hem", "page": 12});
        assert_eq!(
            (converter.convert)("res", &value).unwrap(),
            Value::from("{\"word\":\"hem\",\"page\":12}")
        );
    }
}
