use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use threedqc_session::ExportFormat;

#[derive(Parser, Debug)]
#[command(name = "threedqc")]
#[command(about = "Check 3D commerce assets against a validation schema", long_about = None)]
pub struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `threedqc_session=trace`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a model and write the report
    Check(CheckArgs),
    /// Write the effective schema as a JSON document
    Schema(SchemaArgs),
    /// Show the validator version
    Version,
    /// Show the effective settings
    Settings {
        /// Save the effective settings to the settings file
        #[arg(long)]
        write: bool,
    },
}

/// Schema inputs shared by `check` and `schema`.
#[derive(Args, Debug, Default)]
pub struct SchemaInput {
    /// Schema JSON file replacing the recommended defaults
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Override one schema field, e.g. `fileSizeInKb.maximum=2048` or
    /// `textures.requireDimensionsBePowersOfTwo=no`
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub assignments: Vec<(String, String)>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Model files: one .glb, or a .gltf with its buffers and textures
    #[arg(long = "model", required = true, num_args = 1..)]
    pub model: Vec<PathBuf>,

    /// Product info JSON with expected dimensions
    #[arg(long)]
    pub product_info: Option<PathBuf>,

    #[command(flatten)]
    pub schema: SchemaInput,

    /// Directory for exported reports
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Report formats to export
    #[arg(long = "format", value_enum)]
    pub formats: Vec<ReportFormat>,

    /// Do not write any report files
    #[arg(long)]
    pub no_export: bool,

    /// Print the result as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SchemaArgs {
    #[command(flatten)]
    pub schema: SchemaInput,

    /// Directory to write the schema document to
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Csv,
}

impl From<ReportFormat> for ExportFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Json => ExportFormat::Json,
            ReportFormat::Csv => ExportFormat::Csv,
        }
    }
}

pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
