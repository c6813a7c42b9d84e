//! Relational module.
//!
//! Projects the inferred schema into SQL. The DDL (drop-and-create plus
//! index statements) is written at export time; the task then appends
//! the insert group for every entry. The task owns the open script file
//! and the row id counter, which keeps ids monotonic and gap-free.

use std::fs::File;
use std::io::BufWriter;

use anyhow::Context;
use tracing::debug;

use reltab_model::{Entry, PipelineConfig};
use reltab_sql::{SqlWriter, TableLayout};

use crate::module::{Artifact, ArtifactMap, EntryTask, ModuleSpec, Task};

pub const SPEC: ModuleSpec = ModuleSpec {
    name: "relational",
    dependencies: &["schema"],
    export,
    load: None,
};

struct RelationalTask {
    writer: SqlWriter<BufWriter<File>>,
}

impl EntryTask for RelationalTask {
    fn name(&self) -> &'static str {
        "relational"
    }

    fn run(&mut self, entry: Entry) -> anyhow::Result<Entry> {
        debug!("relational entry task");
        self.writer.write_entry(&entry)?;
        Ok(entry)
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

fn export(config: &PipelineConfig, artifacts: &ArtifactMap) -> anyhow::Result<Vec<Task>> {
    let schema_artifact = artifacts
        .get("schema")
        .and_then(Artifact::as_schema)
        .context("relational: schema artifact missing")?;
    let layout = TableLayout::new(
        &config.resource_id,
        &schema_artifact.entry_schema,
        &config.relational,
    )?;
    let dir = config.create_output_dir()?;
    let file = File::create(dir.join(format!("{}.sql", config.resource_id)))?;
    let mut writer = SqlWriter::new(layout, BufWriter::new(file));
    writer.write_ddl()?;
    Ok(vec![Box::new(RelationalTask { writer })])
}
