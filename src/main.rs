// src/main.rs

//! tfdeploy
//!
//! Entry point for the tfdeploy CLI.
//!
//! This binary archives a local Terraform configuration directory, submits
//! it to a Terraform Cloud workspace as a new configuration version, waits
//! for the upload to be accepted, and creates a run against it. It
//! delegates all real work to the `runner` module.
//!
//! Responsibilities of this file:
//! - Parse CLI arguments
//! - Initialise logging
//! - Hand off execution to the runner
//!
//! There is intentionally *no business logic* here.

mod archive;
mod cli;
mod config;
mod error;
mod remote;
mod runner;

use anyhow::Result;
use clap::Parser;

/// Program entry point.
///
/// Uses Tokio because the remote client is async (reqwest).
#[tokio::main]
async fn main() -> Result<()> {
    // Values from an adjacent .env file fill in anything the environment
    // doesn't already provide.
    dotenvy::dotenv().ok();

    let cli = cli::Cli::parse();
    init_logging(cli.debug);

    runner::run(cli).await?;
    Ok(())
}

/// Stderr logging with an env-filter.
///
/// `--debug` raises the default level to `debug`, which also surfaces the
/// HTTP client's request/response logging. An explicit `RUST_LOG` wins.
fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
