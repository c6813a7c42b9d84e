//! Pipeline runner.
//!
//! Resolves the requested modules into a dependency-ordered list, runs
//! every module's one-time export step, then streams the source once
//! through the collected task chain. Everything is strictly sequential;
//! the first failure aborts the whole run.

use anyhow::Context;
use tracing::{debug, info};

use reltab_ingest::SourceReader;
use reltab_model::{PipelineConfig, PipelineError};

use crate::module::{self, Artifact, ArtifactMap, ModuleSpec, Task};

/// What a completed run did, for reporting.
#[derive(Debug)]
pub struct RunReport {
    pub modules: Vec<&'static str>,
    pub tasks: Vec<&'static str>,
    pub records: u64,
}

/// Resolve requested module names into a single execution order.
///
/// Depth-first: each module's dependencies are resolved before the
/// module itself, each module exactly once no matter how many modules
/// depend on it. Unknown names fail before anything runs.
pub fn resolve(
    requested: &[String],
) -> std::result::Result<Vec<&'static ModuleSpec>, PipelineError> {
    let mut order = Vec::new();
    for name in requested {
        visit(name, &mut order)?;
    }
    Ok(order)
}

fn visit(
    name: &str,
    order: &mut Vec<&'static ModuleSpec>,
) -> std::result::Result<(), PipelineError> {
    if order.iter().any(|module| module.name == name) {
        return Ok(());
    }
    let module = module::find(name).ok_or_else(|| PipelineError::ModuleNotFound(name.to_string()))?;
    for dep in module.dependencies {
        visit(dep, order)?;
    }
    if !order.iter().any(|resolved| resolved.name == module.name) {
        order.push(module);
    }
    Ok(())
}

/// Run the requested modules over the resource in `config.workdir`.
pub fn run(config: &PipelineConfig, requested: &[String]) -> anyhow::Result<RunReport> {
    let modules = resolve(requested)?;
    info!(
        order = ?modules.iter().map(|module| module.name).collect::<Vec<_>>(),
        "resolved module order"
    );

    let mut artifacts = ArtifactMap::new();
    let mut tasks: Vec<Task> = Vec::new();
    for module in &modules {
        for dep in module.dependencies {
            if artifacts.contains_key(*dep) {
                continue;
            }
            let artifact = match module::find(dep).and_then(|spec| spec.load) {
                Some(load) => {
                    load(config).with_context(|| format!("loading artifact of module {dep}"))?
                }
                None => Artifact::Empty,
            };
            artifacts.insert((*dep).to_string(), artifact);
        }
        debug!(module = module.name, "export");
        let module_tasks =
            (module.export)(config, &artifacts).with_context(|| format!("module {}", module.name))?;
        tasks.extend(module_tasks);
    }

    // one pass over the source through the full task chain, record by
    // record: task N for record K completes before task 1 for record K+1
    let mut reader = SourceReader::open(config)?;
    let mut records = 0u64;
    for entry in reader.by_ref() {
        let mut entry = entry?;
        for task in &mut tasks {
            let name = task.name();
            entry = task.run(entry).with_context(|| format!("task {name}"))?;
        }
        records += 1;
    }
    for task in &mut tasks {
        let name = task.name();
        task.finish().with_context(|| format!("closing task {name}"))?;
    }
    info!(records, "pipeline run complete");

    Ok(RunReport {
        modules: modules.iter().map(|module| module.name).collect(),
        tasks: tasks.iter().map(|task| task.name()).collect(),
        records,
    })
}
