//! Line-delimited JSON source reading.
//!
//! JSON input carries no header, so the source order is accumulated from
//! the key order of each record while the stream is consumed (see
//! [`crate::order::merge_source_order`]).

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use reltab_model::{Entry, PipelineError, Result, Value};

use crate::order::merge_source_order;

pub struct JsonlSource {
    lines: Lines<BufReader<File>>,
    order: Vec<String>,
    size: u64,
    line_no: usize,
}

impl JsonlSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            order: Vec::new(),
            size: 0,
            line_no: 0,
        })
    }

    pub fn source_order(&self) -> &[String] {
        &self.order
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    fn parse_line(&mut self, line: &str) -> Result<Entry> {
        let value: Value = serde_json::from_str(line)?;
        let Value::Object(entry) = value else {
            return Err(PipelineError::Message(format!(
                "line {}: expected a JSON object",
                self.line_no
            )));
        };
        let keys: Vec<String> = entry.keys().cloned().collect();
        merge_source_order(&mut self.order, &keys);
        Ok(entry)
    }
}

impl Iterator for JsonlSource {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(error) => return Some(Err(error.into())),
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            let entry = self.parse_line(&line);
            if entry.is_ok() {
                self.size += 1;
            }
            return Some(entry);
        }
    }
}
