// src/runner.rs

use crate::archive;
use crate::cli::Cli;
use crate::config::Config;
use crate::error::Result;
use crate::remote::TfcClient;

use std::path::PathBuf;

/// One deploy request: what to archive and how to label the run.
///
/// Built from user input, immutable afterwards, consumed by a single
/// [`deploy`] call.
#[derive(Debug)]
pub struct RunRequest {
    pub root: PathBuf,
    pub globs: Vec<String>,
    pub files: Vec<PathBuf>,
    pub message: Option<String>,
}

impl From<Cli> for RunRequest {
    fn from(cli: Cli) -> Self {
        Self {
            root: cli.root,
            globs: cli.glob,
            files: cli.file,
            message: cli.message,
        }
    }
}

/// Entry point from `main.rs`.
pub async fn run(cli: Cli) -> Result<()> {
    // Credentials are checked before anything touches the network.
    let config = Config::from_env()?;
    let client = TfcClient::new(&config);

    let run_id = deploy(&client, &config, &cli.into()).await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "ok": true,
            "organization": config.org,
            "workspace": config.workspace,
            "run-id": run_id,
        }))?
    );
    Ok(())
}

/// Sequence the deploy: resolve the workspace, create a configuration
/// version, build and upload the archive, wait for the version to be
/// accepted, then create the run.
///
/// Any failure aborts the whole sequence. Nothing already created remotely
/// is rolled back; a configuration version that never gets a run is an
/// accepted orphan. Progress is reported on stderr before each fallible
/// step so a failure still leaves the ids seen so far.
pub async fn deploy(client: &TfcClient, config: &Config, request: &RunRequest) -> Result<String> {
    eprintln!("Fetching workspace ID");
    let workspace_id = client
        .fetch_workspace_id(&config.org, &config.workspace)
        .await?;
    eprintln!("Workspace ID: {}", workspace_id);

    eprintln!("Creating new config version");
    let (config_version_id, upload_url) = client.create_config_version(&workspace_id).await?;
    eprintln!("Version ID: {}", config_version_id);

    eprintln!("Creating archive");
    let bytes = archive::build(&request.root, &request.globs, &request.files)?;

    eprintln!("Uploading archive");
    client.upload_archive(&upload_url, bytes).await?;

    eprintln!("Waiting for config version to become ready");
    client.wait_for_upload(&config_version_id).await?;

    eprintln!("Creating new run");
    let run_id = client
        .create_run(
            &workspace_id,
            &config_version_id,
            request.message.as_deref(),
        )
        .await?;
    eprintln!("Run ID: {}", run_id);

    Ok(run_id)
}
