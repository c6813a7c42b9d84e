//! CLI argument definitions for the reltab pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "reltab",
    version,
    about = "Infer record schemas and project them into relational SQL",
    long_about = "Read the source file of a resource, infer its record schema and\n\
                  produce a flat dump, a relational SQL script and a resource\n\
                  manifest from one pass over the data."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run pipeline modules over a resource working directory.
    Run(RunArgs),

    /// Remove the generated output of a resource working directory.
    Clean(CleanArgs),

    /// List the registered pipeline modules.
    Modules,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Resource working directory containing config.yaml and source/.
    #[arg(value_name = "WORKDIR")]
    pub workdir: PathBuf,

    /// Modules to run, each pulling in its dependencies. All registered
    /// modules when omitted.
    #[arg(value_name = "MODULE")]
    pub modules: Vec<String>,

    /// Shared configuration merged under the resource configuration
    /// (default: the file named by RELTAB_CONFIG).
    #[arg(long = "shared-config", value_name = "PATH")]
    pub shared_config: Option<PathBuf>,
}

#[derive(Parser)]
pub struct CleanArgs {
    /// Resource working directory.
    #[arg(value_name = "WORKDIR")]
    pub workdir: PathBuf,

    /// Also remove the error logs under log/.
    #[arg(long = "logs")]
    pub logs: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
