//! Subcommand implementations.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{error, info, info_span, warn};

use reltab_cli::errorlog::write_error_log;
use reltab_core::runner::{self, RunReport};
use reltab_model::{PipelineConfig, load_config};

use crate::cli::{CleanArgs, RunArgs};
use crate::summary::{apply_table_style, header_cell, mark_cell, module_cell};

pub struct RunOutcome {
    pub config: PipelineConfig,
    pub report: RunReport,
}

pub fn run_pipeline(args: &RunArgs) -> Result<RunOutcome> {
    let shared = args
        .shared_config
        .clone()
        .or_else(|| std::env::var_os("RELTAB_CONFIG").map(PathBuf::from));
    let config = load_config(&args.workdir, shared.as_deref())
        .with_context(|| format!("loading configuration in {}", args.workdir.display()))?;

    let requested: Vec<String> = if args.modules.is_empty() {
        reltab_core::DEFAULT_MODULES
            .iter()
            .map(|name| (*name).to_string())
            .collect()
    } else {
        args.modules.clone()
    };

    let run_span = info_span!("run", resource = %config.resource_id);
    let _run_guard = run_span.enter();
    let start = Instant::now();
    match runner::run(&config, &requested) {
        Ok(report) => {
            info!(
                records = report.records,
                duration_ms = start.elapsed().as_millis(),
                "run complete"
            );
            Ok(RunOutcome { config, report })
        }
        Err(run_error) => {
            match write_error_log(&config, &run_error) {
                Ok(path) => error!(log = %path.display(), "run failed"),
                Err(log_error) => {
                    warn!(%log_error, "run failed and the error log could not be written");
                }
            }
            Err(run_error)
        }
    }
}

pub fn run_clean(args: &CleanArgs) -> Result<()> {
    let mut targets = vec![args.workdir.join("output")];
    if args.logs {
        targets.push(args.workdir.join("log"));
    }
    for dir in targets {
        if dir.is_dir() {
            fs::remove_dir_all(&dir).with_context(|| format!("removing {}", dir.display()))?;
            info!(dir = %dir.display(), "removed");
        }
    }
    Ok(())
}

pub fn run_modules() {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Module"),
        header_cell("Depends on"),
        header_cell("Reusable"),
    ]);
    apply_table_style(&mut table);
    for module in reltab_core::module::registry() {
        let deps = if module.dependencies.is_empty() {
            "-".to_string()
        } else {
            module.dependencies.join(", ")
        };
        table.add_row(vec![
            module_cell(module.name),
            comfy_table::Cell::new(deps),
            mark_cell(module.load.is_some()),
        ]);
    }
    println!("{table}");
}
