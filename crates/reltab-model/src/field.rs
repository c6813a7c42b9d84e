//! Field descriptors and the inferred schema.
//!
//! A [`Schema`] is an insertion-ordered mapping from field name to
//! [`FieldDescriptor`]. It is populated during inference, optionally
//! reshaped by the entry converter, and read-only for every module after
//! that.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Schema type tags for inferred fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Integer,
    Float,
    Text,
    Bool,
    Table,
}

impl FieldType {
    /// Map a scalar JSON value onto its schema type tag.
    ///
    /// Returns `None` for nulls, arrays and objects, which are handled
    /// structurally before the lattice is consulted.
    pub fn of_scalar(value: &Value) -> Option<FieldType> {
        match value {
            Value::Bool(_) => Some(FieldType::Bool),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(FieldType::Integer),
            Value::Number(_) => Some(FieldType::Float),
            Value::String(_) => Some(FieldType::Text),
            _ => None,
        }
    }

    /// Whether an observation of `observed` is acceptable for a field
    /// already typed `self`. Integer values are compatible with an
    /// already-inferred float field; a float field is never narrowed back.
    pub fn accepts(self, observed: FieldType) -> bool {
        self == observed || (self == FieldType::Float && observed == FieldType::Integer)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Text => "text",
            FieldType::Bool => "bool",
            FieldType::Table => "table",
        };
        f.write_str(name)
    }
}

/// Extra per-field metadata collected during inference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldExtra {
    /// Largest text length observed so far. Text fields only,
    /// monotonically non-decreasing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
}

impl FieldExtra {
    pub fn is_empty(&self) -> bool {
        self.length.is_none()
    }
}

/// Descriptor for one inferred field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub collection: bool,
    /// Sub-fields, present only for table-typed fields. One nesting level
    /// only; sub-fields are always scalar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Schema>,
    #[serde(default, skip_serializing_if = "FieldExtra::is_empty")]
    pub extra: FieldExtra,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            collection: false,
            fields: None,
            extra: FieldExtra::default(),
        }
    }

    /// Create a table-typed descriptor with an empty sub-schema.
    pub fn table(name: impl Into<String>, collection: bool) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Table,
            collection,
            fields: Some(Schema::new()),
            extra: FieldExtra::default(),
        }
    }

    /// Copy of this descriptor under a new name.
    pub fn renamed(&self, target: impl Into<String>) -> Self {
        Self {
            name: target.into(),
            ..self.clone()
        }
    }

    /// Record an observed text length, keeping the running maximum.
    pub fn note_text_length(&mut self, length: u64) {
        let current = self.extra.length.unwrap_or(0);
        self.extra.length = Some(current.max(length));
    }
}

/// Insertion-ordered mapping from field name to descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<FieldDescriptor>", into = "Vec<FieldDescriptor>")]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index.get(name).map(|&idx| &self.fields[idx])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldDescriptor> {
        self.index.get(name).map(|&idx| &mut self.fields[idx])
    }

    /// Insert a descriptor under its own name. Replaces in place when the
    /// name is already present, otherwise appends.
    pub fn insert(&mut self, field: FieldDescriptor) {
        match self.index.get(&field.name) {
            Some(&idx) => self.fields[idx] = field,
            None => {
                self.index.insert(field.name.clone(), self.fields.len());
                self.fields.push(field);
            }
        }
    }

    /// Remove a field by name, preserving the order of the remainder.
    pub fn remove(&mut self, name: &str) -> Option<FieldDescriptor> {
        let idx = self.index.remove(name)?;
        let field = self.fields.remove(idx);
        for slot in self.index.values_mut() {
            if *slot > idx {
                *slot -= 1;
            }
        }
        Some(field)
    }

    pub fn clear(&mut self) {
        self.fields.clear();
        self.index.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FieldDescriptor> {
        self.fields.iter_mut()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

impl From<Vec<FieldDescriptor>> for Schema {
    fn from(fields: Vec<FieldDescriptor>) -> Self {
        let index = fields
            .iter()
            .enumerate()
            .map(|(idx, field)| (field.name.clone(), idx))
            .collect();
        Self { fields, index }
    }
}

impl From<Schema> for Vec<FieldDescriptor> {
    fn from(schema: Schema) -> Self {
        schema.fields
    }
}

impl FromIterator<FieldDescriptor> for Schema {
    fn from_iter<I: IntoIterator<Item = FieldDescriptor>>(iter: I) -> Self {
        let mut schema = Schema::new();
        for field in iter {
            schema.insert(field);
        }
        schema
    }
}
