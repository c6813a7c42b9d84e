use thiserror::Error;

use crate::field::FieldType;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("mismatch, field \"{field}\": was {actual}, expected {expected}")]
    TypeMismatch {
        field: String,
        expected: FieldType,
        actual: FieldType,
    },
    #[error("mismatch, field \"{field}\": value does not match collection flag")]
    CollectionMismatch { field: String },
    #[error("level of nesting not allowed, field \"{field}\"")]
    NestingNotAllowed { field: String },
    #[error("error for entry on row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: Box<PipelineError>,
    },
    #[error("wrongly formatted field directive: \"{0}\"")]
    InvalidDirective(String),
    #[error("unknown converter: {0}")]
    UnknownConverter(String),
    #[error("unknown source field: {0}")]
    UnknownField(String),
    #[error("module not found: {0}")]
    ModuleNotFound(String),
    #[error("unknown value kind for column \"{column}\"")]
    UnsupportedValue { column: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("{0}")]
    Message(String),
}

impl PipelineError {
    /// Wrap an inference failure with the 1-based row it occurred on.
    pub fn on_row(self, row: usize) -> Self {
        match self {
            already @ PipelineError::Row { .. } => already,
            other => PipelineError::Row {
                row,
                source: Box::new(other),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
