//! CSV/TSV source reading.
//!
//! The header row fixes the source order up front. Cells are read as
//! text; the `import.csv.cast_fields` configuration names the columns
//! that carry numbers.

use std::fs::File;
use std::path::Path;

use reltab_model::config::{CastField, CastKind, CsvImportConfig};
use reltab_model::{Entry, PipelineError, Result, Value};

pub struct CsvSource {
    records: csv::StringRecordsIntoIter<File>,
    headers: Vec<String>,
    casts: Vec<CastField>,
    size: u64,
}

impl CsvSource {
    pub fn open(path: &Path, delimiter: u8, import: &CsvImportConfig) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_path(path)?;
        let mut headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if let Some(first) = headers.first_mut()
            && let Some(stripped) = first.strip_prefix('\u{feff}')
        {
            // files exported from spreadsheets tend to start with a BOM
            *first = stripped.to_string();
        }
        for cast in &import.cast_fields {
            if !headers.iter().any(|header| *header == cast.name) {
                return Err(PipelineError::Message(format!(
                    "cast field \"{}\" not present in source header",
                    cast.name
                )));
            }
        }
        Ok(Self {
            records: reader.into_records(),
            headers,
            casts: import.cast_fields.clone(),
            size: 0,
        })
    }

    pub fn source_order(&self) -> &[String] {
        &self.headers
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    fn entry_from_record(&self, record: &csv::StringRecord) -> Result<Entry> {
        let mut entry = Entry::new();
        for (header, cell) in self.headers.iter().zip(record.iter()) {
            entry.insert(header.clone(), Value::String(cell.to_string()));
        }
        for cast in &self.casts {
            let raw = match entry.get(&cast.name) {
                Some(Value::String(raw)) => raw.clone(),
                _ => {
                    return Err(PipelineError::Message(format!(
                        "missing value for cast field \"{}\"",
                        cast.name
                    )));
                }
            };
            entry.insert(cast.name.clone(), cast_value(cast, &raw)?);
        }
        Ok(entry)
    }
}

fn cast_value(cast: &CastField, raw: &str) -> Result<Value> {
    match cast.cast {
        CastKind::Int => raw.parse::<i64>().map(Value::from).map_err(|_| {
            PipelineError::Message(format!(
                "field \"{}\": cannot cast \"{raw}\" to int",
                cast.name
            ))
        }),
        CastKind::Float => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| {
                PipelineError::Message(format!(
                    "field \"{}\": cannot cast \"{raw}\" to float",
                    cast.name
                ))
            }),
    }
}

impl Iterator for CsvSource {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(error) => return Some(Err(error.into())),
        };
        let entry = self.entry_from_record(&record);
        if entry.is_ok() {
            self.size += 1;
        }
        Some(entry)
    }
}
