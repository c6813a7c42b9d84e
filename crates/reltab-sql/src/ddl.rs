//! DDL rendering.

use crate::layout::{Column, TableLayout};

const TABLE_OPTIONS: &str = "CHARACTER SET utf8mb4\nCOLLATE utf8mb4_unicode_ci;\n";

/// Render the drop-and-create statements and the index statements for a
/// layout.
///
/// The script drops the primary table and every child table it is about
/// to create before creating them, so re-running it against a database
/// that already holds the resource cannot fail on existing objects.
pub fn schema_ddl(layout: &TableLayout) -> (String, String) {
    let mut ddl = String::new();
    for child in &layout.children {
        ddl.push_str(&format!("DROP TABLE IF EXISTS {};\n", child.name));
    }
    ddl.push_str(&format!("DROP TABLE IF EXISTS {};\n", layout.table));
    ddl.push('\n');

    ddl.push_str(&format!("CREATE TABLE {} (\n", layout.table));
    ddl.push_str("    __id INT NOT NULL,\n");
    for column in &layout.columns {
        ddl.push_str(&format!("    {} {},\n", column.name, column.column_type));
    }
    ddl.push_str("    PRIMARY KEY (__id)\n)\n");
    ddl.push_str(TABLE_OPTIONS);

    for child in &layout.children {
        ddl.push('\n');
        ddl.push_str(&format!("CREATE TABLE {} (\n", child.name));
        ddl.push_str("    __parent_id INT NOT NULL,\n");
        for column in &child.columns {
            ddl.push_str(&format!("    {} {},\n", column.name, column.column_type));
        }
        ddl.push_str(&format!(
            "    FOREIGN KEY (__parent_id) REFERENCES {} (__id)\n)\n",
            layout.table
        ));
        ddl.push_str(TABLE_OPTIONS);
    }

    let mut indexes = String::new();
    write_indexes(&mut indexes, &layout.table, &layout.columns);
    for child in &layout.children {
        write_indexes(&mut indexes, &child.name, &child.columns);
    }

    (ddl, indexes)
}

fn write_indexes(out: &mut String, table: &str, columns: &[Column]) {
    for column in columns {
        if let Some(prefix) = column.column_type.index_prefix() {
            out.push_str(&format!(
                "CREATE INDEX ix_{table}_{column} ON {table} ({column}({prefix}));\n",
                column = column.name
            ));
        }
    }
}
