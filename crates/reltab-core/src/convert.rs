//! Entry conversion.
//!
//! The converter is built once per run from the export field directives.
//! Building mutates the inferred schema into the output shape; the
//! returned converter then reshapes every entry to match, followed by
//! text sanitization. The schema is read-only for every module after the
//! build step.

use unicode_properties::{GeneralCategory, UnicodeGeneralCategory};

use reltab_model::{
    Entry, FieldDescriptor, FieldDirective, FieldType, PipelineConfig, PipelineError, Result,
    Schema, Value,
};

use crate::converters::{self, Converter};
use crate::module::EntryTask;

#[derive(Debug)]
struct ConvertStep {
    source: String,
    target: String,
    converter: Option<&'static Converter>,
}

/// Per-record projection of entries onto the reshaped schema.
#[derive(Debug)]
pub struct EntryConverter {
    resource_id: String,
    schema: Schema,
    steps: Vec<ConvertStep>,
}

/// Apply the export field directives to the schema and build the
/// matching per-record converter.
///
/// With an empty directive list or a `"..."` wildcard every source field
/// is retained unless excluded; without the wildcard the schema is
/// cleared and rebuilt from the directives alone. Unknown converters and
/// unknown source fields fail here, before any record is processed.
pub fn build_entry_converter(
    config: &PipelineConfig,
    schema: &mut Schema,
) -> Result<EntryConverter> {
    let directives = config.export.parsed_fields()?;
    // only mapping directives rebuild the schema from scratch; a list of
    // bare excludes keeps the unmentioned fields
    let has_map = directives
        .iter()
        .any(|directive| matches!(directive, FieldDirective::Map { .. }));
    let keep_all = !has_map
        || directives
            .iter()
            .any(|directive| *directive == FieldDirective::Wildcard);

    let source = schema.clone();
    if !keep_all {
        schema.clear();
    }

    let mut steps = Vec::new();
    for directive in directives {
        match directive {
            FieldDirective::Wildcard => {}
            FieldDirective::Exclude { name } => {
                schema.remove(&name);
            }
            FieldDirective::Map {
                name,
                converter,
                target,
            } => {
                let mut descriptor = if name == "*" {
                    // placeholder, the converter's schema update decides
                    // the real shape
                    FieldDescriptor::new(target.clone(), FieldType::Text)
                } else {
                    // TODO the source descriptor's length is copied as-is,
                    // a rename does not re-measure the values
                    source
                        .get(&name)
                        .ok_or_else(|| PipelineError::UnknownField(name.clone()))?
                        .renamed(target.clone())
                };
                let converter = match converter {
                    Some(converter_name) => {
                        let converter = converters::lookup(&converter_name)
                            .ok_or(PipelineError::UnknownConverter(converter_name))?;
                        descriptor = (converter.update_schema)(&descriptor);
                        descriptor.name = target.clone();
                        Some(converter)
                    }
                    None => None,
                };
                schema.insert(descriptor);
                steps.push(ConvertStep {
                    source: name,
                    target,
                    converter,
                });
            }
        }
    }

    Ok(EntryConverter {
        resource_id: config.resource_id.clone(),
        schema: schema.clone(),
        steps,
    })
}

impl EntryConverter {
    /// Project one entry onto the output schema.
    pub fn convert(&self, entry: &Entry) -> Result<Entry> {
        let mut out = Entry::new();

        // carry over every schema field present in the input
        for field in self.schema.iter() {
            if let Some(value) = entry.get(&field.name) {
                out.insert(field.name.clone(), value.clone());
            }
        }

        // convert or rename fields
        for step in &self.steps {
            let value = if step.source == "*" {
                Value::Object(entry.clone())
            } else {
                // the source field's existence was checked against the
                // schema at build time; a record simply omitting it reads
                // as null
                entry.get(&step.source).cloned().unwrap_or(Value::Null)
            };
            let value = match step.converter {
                Some(converter) => (converter.convert)(&self.resource_id, &value)?,
                None => value,
            };
            out.insert(step.target.clone(), value);
        }

        // sanitize text, and make sure collection fields are never null
        for field in self.schema.iter() {
            if field.collection {
                let items = match out.get(&field.name) {
                    Some(Value::Array(items)) => items.clone(),
                    _ => Vec::new(),
                };
                let items = if field.field_type == FieldType::Text {
                    items
                        .into_iter()
                        .map(|item| match item {
                            Value::String(text) => Value::String(clean_text(&text)),
                            other => other,
                        })
                        .collect()
                } else {
                    items
                };
                out.insert(field.name.clone(), Value::Array(items));
            } else if field.field_type == FieldType::Text
                && let Some(Value::String(text)) = out.get(&field.name)
            {
                let cleaned = clean_text(text);
                out.insert(field.name.clone(), Value::String(cleaned));
            }
        }

        Ok(out)
    }
}

impl EntryTask for EntryConverter {
    fn name(&self) -> &'static str {
        "convert"
    }

    fn run(&mut self, entry: Entry) -> anyhow::Result<Entry> {
        Ok(self.convert(&entry)?)
    }
}

/// Strip control, formatting and unassigned characters, normalize space
/// separators to an ordinary space, keep literal newlines.
pub fn clean_text(text: &str) -> String {
    text.chars()
        .filter_map(|ch| {
            if ch == '\n' {
                return Some(ch);
            }
            match ch.general_category() {
                GeneralCategory::Control
                | GeneralCategory::Format
                | GeneralCategory::Unassigned => None,
                GeneralCategory::SpaceSeparator => Some(' '),
                _ => Some(ch),
            }
        })
        .collect()
}
