//! Source discovery and the unified reader.

use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use reltab_model::{Entry, PipelineConfig, PipelineError, Result};

use crate::csv_source::CsvSource;
use crate::jsonl_source::JsonlSource;

/// Reader over the single file in the resource's `source/` directory.
///
/// The reader is a fallible iterator of entries. `source_order()` and
/// `size()` are only meaningful once the iterator has been fully
/// drained; schema inference exhausts the stream before either is read.
pub enum SourceReader {
    Csv(CsvSource),
    Jsonl(JsonlSource),
}

impl SourceReader {
    pub fn open(config: &PipelineConfig) -> Result<Self> {
        let input = find_source_file(config)?;
        info!(file = %input.display(), "reading source file");
        match input.extension().and_then(OsStr::to_str) {
            Some("csv") => Ok(SourceReader::Csv(CsvSource::open(
                &input,
                b',',
                &config.import_settings.csv,
            )?)),
            Some("tsv") => Ok(SourceReader::Csv(CsvSource::open(
                &input,
                b'\t',
                &config.import_settings.csv,
            )?)),
            _ => Ok(SourceReader::Jsonl(JsonlSource::open(&input)?)),
        }
    }

    /// Field names roughly in the order they first appear in the source.
    pub fn source_order(&self) -> &[String] {
        match self {
            SourceReader::Csv(source) => source.source_order(),
            SourceReader::Jsonl(source) => source.source_order(),
        }
    }

    /// Number of entries read so far; the total once drained.
    pub fn size(&self) -> u64 {
        match self {
            SourceReader::Csv(source) => source.size(),
            SourceReader::Jsonl(source) => source.size(),
        }
    }
}

impl Iterator for SourceReader {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            SourceReader::Csv(source) => source.next(),
            SourceReader::Jsonl(source) => source.next(),
        }
    }
}

fn find_source_file(config: &PipelineConfig) -> Result<PathBuf> {
    let dir = config.source_dir();
    let mut files: Vec<PathBuf> = fs::read_dir(&dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    match files.len() {
        0 => Err(PipelineError::Message(format!(
            "no input file in {}",
            dir.display()
        ))),
        1 => Ok(files.remove(0)),
        _ => {
            warn!("pipeline supports one input file in source/ and will select the first file");
            Ok(files.remove(0))
        }
    }
}
