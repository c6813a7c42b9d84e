pub mod config;
pub mod directive;
pub mod entry;
pub mod error;
pub mod field;

pub use config::{
    CastField, CastKind, ConfiguredField, ExportConfig, MetadataConfig, MultiLang, PipelineConfig,
    RelationalConfig, load_config,
};
pub use directive::FieldDirective;
pub use entry::{Entry, Value};
pub use error::{PipelineError, Result};
pub use field::{FieldDescriptor, FieldExtra, FieldType, Schema};
