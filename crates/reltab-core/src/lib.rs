pub mod convert;
pub mod converters;
pub mod infer;
pub mod module;
pub mod modules;
pub mod runner;

pub use convert::{EntryConverter, build_entry_converter, clean_text};
pub use converters::Converter;
pub use infer::infer_schema;
pub use module::{
    Artifact, ArtifactMap, DEFAULT_MODULES, EntryTask, ModuleSpec, SchemaArtifact, Task,
};
pub use runner::{RunReport, resolve, run};
