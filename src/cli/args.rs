//! Command-line argument definitions

use clap::Args;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Project file to load
    #[arg(short, long)]
    pub project: String,

    /// File to write the output to
    #[arg(short, long)]
    pub outfile: String,

    /// TOML file overriding the fixed export profile
    #[arg(long)]
    pub config: Option<String>,

    /// First frame to export (selects an explicit range)
    #[arg(long)]
    pub start_frame: Option<i64>,

    /// Last frame to export (selects an explicit range)
    #[arg(long)]
    pub end_frame: Option<i64>,

    /// Additional arguments are accepted and ignored
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    pub remainder: Vec<String>,
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Project file to load
    #[arg(short, long)]
    pub project: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
