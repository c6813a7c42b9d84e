//! Built-in pipeline modules.

pub mod dump;
pub mod manifest;
pub mod metadata;
pub mod relational;
pub mod schema;
