// src/cli.rs

use clap::Parser;
use std::path::PathBuf;

/// Creates a new run in a Terraform Cloud workspace.
///
/// Credentials and workspace identity come from the environment
/// (`TF_USER_TOKEN`, `TF_WORKSPACE_NAME`, `TF_ORG_NAME`); flags only
/// control what goes into the archive and how it is labelled.
#[derive(Parser, Debug)]
#[command(name = "tfdeploy", version)]
pub struct Cli {
    /// Message to attach to this run in Terraform Cloud
    #[arg(short, long, value_name = "STR")]
    pub message: Option<String>,

    /// Glob pattern of files to include in the run, relative to the root.
    ///
    /// Can be passed multiple times. Patterns that match nothing are
    /// skipped silently.
    #[arg(
        short,
        long,
        value_name = "GLOB",
        default_values_t = default_globs()
    )]
    pub glob: Vec<String>,

    /// Individual file or directory to add directly to the run, relative
    /// to the root. Directories are added recursively.
    ///
    /// Can be passed multiple times.
    #[arg(short, long, value_name = "FILE")]
    pub file: Vec<PathBuf>,

    /// Enable verbose HTTP logging
    #[arg(short, long)]
    pub debug: bool,

    /// Path to the terraform root
    #[arg(value_name = "PATH", default_value = ".")]
    pub root: PathBuf,
}

/// Patterns covering source config and variable files.
pub fn default_globs() -> Vec<String> {
    vec!["*.tf".to_string(), "*.auto.tfvars".to_string()]
}
