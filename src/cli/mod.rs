//! CLI module for VExport
//!
//! This module handles command-line argument parsing.

use clap::{Parser, Subcommand};

pub mod args;

/// VExport CLI Project Exporter
///
/// A command-line tool for exporting video-editing projects to rendered
/// media files by driving an external compositing engine.
#[derive(Parser)]
#[command(name = "vexport")]
#[command(about = "VExport CLI Project Exporter - Render project timelines to media files")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Export a project to a media file
    Export(args::ExportArgs),
    /// Resolve project settings and export range without rendering
    Inspect(args::InspectArgs),
}
