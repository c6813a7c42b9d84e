pub mod ddl;
pub mod escape;
pub mod layout;
pub mod writer;

pub use ddl::schema_ddl;
pub use escape::{escape_string, quote_string};
pub use layout::{ChildTable, Column, ColumnType, TableLayout};
pub use writer::SqlWriter;
