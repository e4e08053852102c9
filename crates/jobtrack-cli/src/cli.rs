//! CLI argument definitions for `jobtrack`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "jobtrack",
    version,
    about = "Import job application exports and reconcile duplicates",
    long_about = "Import job application CSV exports from job boards and trackers.\n\n\
                  Detects the export format, maps its columns onto canonical fields,\n\
                  groups near-duplicate applications against a JSON record store,\n\
                  and commits once every duplicate group has a decision."
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

    /// Log output format (pretty for humans, json for machine parsing).
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

    /// Allow record values (companies, contacts, notes) in logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Reconcile settings file (TOML). Missing keys keep their defaults.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Extra templates (TOML), registered after the built-in ones.
    #[arg(long = "templates", value_name = "PATH", global = true)]
    pub templates: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the known export templates.
    Templates,

    /// Print a blank CSV for a template.
    TemplateCsv(TemplateCsvArgs),

    /// Rank templates against a CSV file's headers.
    Detect(DetectArgs),

    /// Show how a CSV file's headers map onto canonical fields.
    Map(MapArgs),

    /// List duplicate groups a CSV file would create against a store.
    Duplicates(DuplicatesArgs),

    /// Import a CSV file into a store.
    Import(ImportArgs),
}

#[derive(Parser)]
pub struct TemplateCsvArgs {
    /// Template id (see `jobtrack templates`).
    #[arg(value_name = "ID")]
    pub template: String,

    /// Include the template's example rows.
    #[arg(long = "examples")]
    pub examples: bool,
}

#[derive(Parser)]
pub struct DetectArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Parser)]
pub struct MapArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Use this template instead of detecting one.
    #[arg(long = "template", value_name = "ID")]
    pub template: Option<String>,

    /// Print the mapping as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct DuplicatesArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// JSON record store to compare against.
    #[arg(long = "store", value_name = "PATH")]
    pub store: PathBuf,

    /// Use this template instead of detecting one.
    #[arg(long = "template", value_name = "ID")]
    pub template: Option<String>,

    /// Print the groups as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct ImportArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// JSON record store to import into (created if missing).
    #[arg(long = "store", value_name = "PATH")]
    pub store: PathBuf,

    /// Use this template instead of detecting one.
    #[arg(long = "template", value_name = "ID")]
    pub template: Option<String>,

    /// Decisions for duplicate groups (JSON object keyed by group id).
    #[arg(long = "resolutions", value_name = "PATH")]
    pub resolutions: Option<PathBuf>,

    /// Resolve remaining groups with their recommended action.
    ///
    /// Groups below the skip threshold have no recommendation and still
    /// need an explicit decision.
    #[arg(long = "accept-recommendations")]
    pub accept_recommendations: bool,

    /// Resolve and report without writing the store.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
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
