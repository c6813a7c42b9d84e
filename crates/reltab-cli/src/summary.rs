//! Run summary table.

use std::path::{Path, PathBuf};

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use reltab_model::PipelineConfig;

use crate::commands::RunOutcome;

pub fn print_summary(outcome: &RunOutcome) {
    let config = &outcome.config;
    let report = &outcome.report;
    println!("Resource: {}", config.resource_id);
    println!("Output: {}", config.output_dir().display());
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Module"),
        header_cell("Output"),
        header_cell("Written"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    for name in &report.modules {
        let output = module_output(config, name);
        let written = output.as_ref().is_some_and(|path| path.is_file());
        table.add_row(vec![
            module_cell(name),
            path_cell(config, output.as_deref()),
            mark_cell(written),
        ]);
    }
    println!("{table}");
    println!("Records: {}", report.records);
}

/// Output file a module is known to produce, if any.
fn module_output(config: &PipelineConfig, module: &str) -> Option<PathBuf> {
    let dir = config.output_dir();
    match module {
        "metadata" => Some(dir.join("metadata").join("metadata.json")),
        "schema" => Some(dir.join("schema").join("schema.json")),
        "dump" => Some(dir.join(format!("{}.jsonl", config.resource_id))),
        "relational" => Some(dir.join(format!("{}.sql", config.resource_id))),
        "manifest" => Some(dir.join(format!("{}_manifest.yaml", config.resource_id))),
        _ => None,
    }
}

fn path_cell(config: &PipelineConfig, path: Option<&Path>) -> Cell {
    match path {
        Some(path) => {
            let shown = path.strip_prefix(&config.workdir).unwrap_or(path);
            Cell::new(shown.display())
        }
        None => dim_cell("-"),
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn module_cell(name: &str) -> Cell {
    Cell::new(name).fg(Color::Blue).add_attribute(Attribute::Bold)
}

pub fn mark_cell(set: bool) -> Cell {
    if set {
        Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold)
    } else {
        dim_cell("-")
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
