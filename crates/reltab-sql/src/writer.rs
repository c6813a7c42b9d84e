//! Stateful DML writer.
//!
//! The writer owns the output handle and the next row id. Ids are
//! assigned in write order, so they stay monotonic and gap-free as long
//! as there is exactly one writer per output file, which the pipeline's
//! strictly sequential task chain guarantees.

use std::io::Write;

use reltab_model::{Entry, PipelineError, Result, Value};

use crate::ddl::schema_ddl;
use crate::escape::quote_string;
use crate::layout::{ChildTable, TableLayout};

pub struct SqlWriter<W: Write> {
    layout: TableLayout,
    out: W,
    next_id: i64,
}

impl<W: Write> SqlWriter<W> {
    pub fn new(layout: TableLayout, out: W) -> Self {
        Self {
            layout,
            out,
            next_id: 1,
        }
    }

    /// Write the drop-and-create statements followed by the index
    /// statements.
    pub fn write_ddl(&mut self) -> Result<()> {
        let (ddl, indexes) = schema_ddl(&self.layout);
        self.out.write_all(ddl.as_bytes())?;
        if !indexes.is_empty() {
            self.out.write_all(b"\n")?;
            self.out.write_all(indexes.as_bytes())?;
        }
        self.out.write_all(b"\n")?;
        Ok(())
    }

    /// Write the insert group for one entry: the primary row first, then
    /// one insert per element of each populated collection field.
    pub fn write_entry(&mut self, entry: &Entry) -> Result<()> {
        let id = self.next_id;
        self.next_id += 1;

        let mut columns = vec!["__id".to_string()];
        let mut values = vec![id.to_string()];
        for (key, value) in entry {
            if value.is_null() {
                continue;
            }
            if self.layout.column(key).is_none() {
                continue;
            }
            columns.push(key.clone());
            values.push(sql_value(key, value)?);
        }
        writeln!(
            self.out,
            "INSERT INTO {} ({}) VALUES ({});",
            self.layout.table,
            columns.join(", "),
            values.join(", ")
        )?;

        for child in &self.layout.children {
            let Some(value) = entry.get(&child.field) else {
                continue;
            };
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    for item in items {
                        write_child_row(&mut self.out, child, id, item)?;
                    }
                }
                Value::Object(_) => write_child_row(&mut self.out, child, id, value)?,
                _ => {
                    return Err(PipelineError::UnsupportedValue {
                        column: child.field.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn write_child_row<W: Write>(
    out: &mut W,
    child: &ChildTable,
    parent_id: i64,
    item: &Value,
) -> Result<()> {
    let mut columns = vec!["__parent_id".to_string()];
    let mut values = vec![parent_id.to_string()];
    match item {
        Value::Object(map) => {
            for (key, value) in map {
                if value.is_null() {
                    continue;
                }
                if !child.columns.iter().any(|column| column.name == *key) {
                    continue;
                }
                columns.push(key.clone());
                values.push(sql_value(key, value)?);
            }
        }
        scalar => {
            columns.push("value".to_string());
            values.push(sql_value(&child.field, scalar)?);
        }
    }
    writeln!(
        out,
        "INSERT INTO {} ({}) VALUES ({});",
        child.name,
        columns.join(", "),
        values.join(", ")
    )?;
    Ok(())
}

fn sql_value(column: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(text) => Ok(quote_string(text)),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(true) => Ok("TRUE".to_string()),
        Value::Bool(false) => Ok("FALSE".to_string()),
        _ => Err(PipelineError::UnsupportedValue {
            column: column.to_string(),
        }),
    }
}
