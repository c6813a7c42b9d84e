//! Table layout derived from an inferred schema.
//!
//! One primary table per resource with a synthetic `__id` identity
//! column and one column per scalar field. Every collection field and
//! every table-typed field becomes a child table
//! `<resource>__<field>` whose rows carry a `__parent_id` foreign key to
//! the parent row. Scalar collections store their elements in a single
//! `value` column; table fields get one column per sub-field.

use std::fmt;

use reltab_model::{
    FieldDescriptor, FieldType, PipelineError, RelationalConfig, Result, Schema,
};

/// SQL column type chosen by the schema type tag and the configured
/// length cutoff. Text at or below the cutoff is an indexable
/// `VARCHAR(n)`; longer text is unindexed `TEXT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Float,
    Bool,
    VarChar(u64),
    Text,
}

impl ColumnType {
    /// Prefix length for the column's index, when the column is indexed
    /// at all.
    pub fn index_prefix(self) -> Option<u64> {
        match self {
            ColumnType::VarChar(length) => Some(length),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Int => f.write_str("INT"),
            ColumnType::Float => f.write_str("FLOAT"),
            ColumnType::Bool => f.write_str("BOOLEAN"),
            ColumnType::VarChar(length) => write!(f, "VARCHAR({length})"),
            ColumnType::Text => f.write_str("TEXT"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

/// Child table for one collection or table-typed field.
#[derive(Debug, Clone)]
pub struct ChildTable {
    /// Table name, `<resource>__<field>`.
    pub name: String,
    /// The schema field this child table holds.
    pub field: String,
    /// Value columns, not counting `__parent_id`.
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone)]
pub struct TableLayout {
    pub table: String,
    /// Scalar columns of the primary table, not counting `__id`.
    pub columns: Vec<Column>,
    pub children: Vec<ChildTable>,
}

impl TableLayout {
    pub fn new(resource_id: &str, schema: &Schema, options: &RelationalConfig) -> Result<Self> {
        let mut columns = Vec::new();
        let mut children = Vec::new();
        for field in schema.iter() {
            if field.field_type == FieldType::Table {
                let sub_schema = field.fields.as_ref().ok_or_else(|| {
                    PipelineError::UnsupportedValue {
                        column: field.name.clone(),
                    }
                })?;
                let sub_columns = sub_schema
                    .iter()
                    .map(|sub| scalar_column(sub, options))
                    .collect::<Result<Vec<_>>>()?;
                children.push(ChildTable {
                    name: child_table_name(resource_id, &field.name),
                    field: field.name.clone(),
                    columns: sub_columns,
                });
            } else if field.collection {
                children.push(ChildTable {
                    name: child_table_name(resource_id, &field.name),
                    field: field.name.clone(),
                    columns: vec![Column {
                        name: "value".to_string(),
                        column_type: scalar_type(field, options)?,
                    }],
                });
            } else {
                columns.push(scalar_column(field, options)?);
            }
        }
        Ok(Self {
            table: resource_id.to_string(),
            columns,
            children,
        })
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn child(&self, field: &str) -> Option<&ChildTable> {
        self.children.iter().find(|child| child.field == field)
    }
}

fn child_table_name(resource_id: &str, field: &str) -> String {
    format!("{resource_id}__{field}")
}

fn scalar_column(field: &FieldDescriptor, options: &RelationalConfig) -> Result<Column> {
    Ok(Column {
        name: field.name.clone(),
        column_type: scalar_type(field, options)?,
    })
}

fn scalar_type(field: &FieldDescriptor, options: &RelationalConfig) -> Result<ColumnType> {
    match field.field_type {
        FieldType::Integer => Ok(ColumnType::Int),
        FieldType::Float => Ok(ColumnType::Float),
        FieldType::Bool => Ok(ColumnType::Bool),
        FieldType::Text => Ok(match field.extra.length {
            Some(length) if length <= options.varchar_cutoff => {
                ColumnType::VarChar(length.max(1))
            }
            _ => ColumnType::Text,
        }),
        FieldType::Table => Err(PipelineError::UnsupportedValue {
            column: field.name.clone(),
        }),
    }
}
