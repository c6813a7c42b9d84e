//! Record values.
//!
//! An entry is one record of the source: an insertion-ordered mapping
//! from field name to a JSON value (`serde_json` with `preserve_order`).
//! Entries are immutable once produced by a reader; schema-driven
//! transforms build new entries instead of mutating in place.

pub use serde_json::Value;

pub type Entry = serde_json::Map<String, Value>;
