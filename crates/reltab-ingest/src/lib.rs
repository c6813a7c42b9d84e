pub mod csv_source;
pub mod jsonl_source;
pub mod order;
pub mod source;

pub use csv_source::CsvSource;
pub use jsonl_source::JsonlSource;
pub use order::merge_source_order;
pub use source::SourceReader;
