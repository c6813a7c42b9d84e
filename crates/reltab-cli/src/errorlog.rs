//! Error logs for failed runs.
//!
//! A fatal pipeline failure leaves a timestamped log file under the
//! resource's `log/` directory, so unattended batch runs keep a record
//! of what went wrong after the process has exited.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;

use reltab_model::PipelineConfig;

/// Write the error chain of a failed run to
/// `log/<resource_id>_<timestamp>.log` and return the path.
pub fn write_error_log(config: &PipelineConfig, error: &anyhow::Error) -> anyhow::Result<PathBuf> {
    let dir = config.create_log_dir().context("creating log directory")?;
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("{}_{stamp}.log", config.resource_id));

    let mut body = String::new();
    for (depth, cause) in error.chain().enumerate() {
        if depth == 0 {
            body.push_str(&format!("error: {cause}\n"));
        } else {
            body.push_str(&format!("  caused by: {cause}\n"));
        }
    }
    fs::write(&path, body).with_context(|| format!("writing error log {}", path.display()))?;
    Ok(path)
}
