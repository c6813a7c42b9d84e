//! Dump module.
//!
//! Writes each converted entry as one JSON line to
//! `output/<resource_id>.jsonl`. The task owns the open file and passes
//! entries through unchanged.

use std::fs::File;
use std::io::{BufWriter, Write};

use tracing::debug;

use reltab_model::{Entry, PipelineConfig};

use crate::module::{ArtifactMap, EntryTask, ModuleSpec, Task};

pub const SPEC: ModuleSpec = ModuleSpec {
    name: "dump",
    dependencies: &["schema"],
    export,
    load: None,
};

struct DumpTask {
    out: BufWriter<File>,
}

impl EntryTask for DumpTask {
    fn name(&self) -> &'static str {
        "dump"
    }

    fn run(&mut self, entry: Entry) -> anyhow::Result<Entry> {
        debug!("dump entry task");
        serde_json::to_writer(&mut self.out, &entry)?;
        self.out.write_all(b"\n")?;
        Ok(entry)
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

fn export(config: &PipelineConfig, _artifacts: &ArtifactMap) -> anyhow::Result<Vec<Task>> {
    let dir = config.create_output_dir()?;
    let file = File::create(dir.join(format!("{}.jsonl", config.resource_id)))?;
    Ok(vec![Box::new(DumpTask {
        out: BufWriter::new(file),
    })])
}
