// src/remote.rs

use crate::config::Config;
use crate::error::{Error, Result};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::{Duration, Instant};

/// JSON:API media type expected by every Terraform Cloud endpoint except
/// the raw archive upload.
const MEDIA_TYPE: &str = "application/vnd.api+json";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);

const POLL_INTERVAL: Duration = Duration::from_secs(2);
const POLL_TIMEOUT: Duration = Duration::from_secs(600);

const STATUS_UPLOADED: &str = "uploaded";
const STATUS_ERRORED: &str = "errored";

/* ---------------- response documents ---------------- */

#[derive(Debug, Deserialize)]
struct Document<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct Workspace {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ConfigVersionCreated {
    id: String,
    attributes: CreatedAttributes,
}

#[derive(Debug, Deserialize)]
struct CreatedAttributes {
    #[serde(rename = "upload-url")]
    upload_url: String,
}

#[derive(Debug, Deserialize)]
struct ConfigVersion {
    attributes: ConfigVersionAttributes,
}

#[derive(Debug, Deserialize)]
struct ConfigVersionAttributes {
    status: String,
    error: Option<String>,
    #[serde(rename = "error-message")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Run {
    id: String,
}

/* ---------------- client ---------------- */

/// Client for the Terraform Cloud v2 API.
///
/// One instance per invocation; every call is a single blocking exchange
/// and the mutating calls (create config version, upload, create run) are
/// issued exactly once — retrying them would create duplicate remote
/// objects.
pub struct TfcClient {
    http: reqwest::Client,
    api_host: String,
    token: String,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl TfcClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_host: config.api_host.clone(),
            token: config.token.clone(),
            poll_interval: POLL_INTERVAL,
            poll_timeout: POLL_TIMEOUT,
        }
    }

    /// Override the delay between status polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Override the overall deadline for the status poll.
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Resolve a workspace name within an organization to its opaque id.
    pub async fn fetch_workspace_id(&self, org: &str, workspace: &str) -> Result<String> {
        let url = format!(
            "{}/organizations/{}/workspaces/{}",
            self.api_host, org, workspace
        );
        tracing::debug!(%url, "GET workspace");

        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, MEDIA_TYPE)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let doc: Document<Workspace> = read_json(resp).await?;
        Ok(doc.data.id)
    }

    /// Create a configuration version in the workspace and return its id
    /// together with the pre-signed upload URL.
    ///
    /// `auto-queue-runs` is off so the upload does not trigger a run by
    /// itself; the run is created explicitly after the version is ready.
    pub async fn create_config_version(&self, workspace_id: &str) -> Result<(String, String)> {
        let url = format!(
            "{}/workspaces/{}/configuration-versions",
            self.api_host, workspace_id
        );
        let payload = json!({
            "data": {
                "type": "configuration-version",
                "attributes": { "auto-queue-runs": false },
            }
        });
        tracing::debug!(%url, "POST configuration version");

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, MEDIA_TYPE)
            .timeout(REQUEST_TIMEOUT)
            .body(payload.to_string())
            .send()
            .await?;

        let doc: Document<ConfigVersionCreated> = read_json(resp).await?;
        Ok((doc.data.id, doc.data.attributes.upload_url))
    }

    /// PUT the archive bytes to the pre-signed upload URL.
    ///
    /// The URL is not on the API host and needs no bearer token, only the
    /// octet-stream content type.
    pub async fn upload_archive(&self, upload_url: &str, archive: Vec<u8>) -> Result<()> {
        tracing::debug!(url = %upload_url, bytes = archive.len(), "PUT archive");

        let resp = self
            .http
            .put(upload_url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .timeout(UPLOAD_TIMEOUT)
            .body(archive)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Remote { status, body });
        }
        Ok(())
    }

    /// Poll the configuration version until it reaches a terminal status.
    ///
    /// Returns normally on `uploaded`; fails with
    /// [`Error::BadConfigVersion`] on `errored`, carrying the remote error
    /// code and message. Every other status keeps polling, with a fixed
    /// delay between reads and an overall deadline.
    pub async fn wait_for_upload(&self, config_version_id: &str) -> Result<()> {
        let url = format!(
            "{}/configuration-versions/{}",
            self.api_host, config_version_id
        );
        let deadline = Instant::now() + self.poll_timeout;

        loop {
            let resp = self
                .http
                .get(&url)
                .bearer_auth(&self.token)
                .header(CONTENT_TYPE, MEDIA_TYPE)
                .timeout(REQUEST_TIMEOUT)
                .send()
                .await?;

            let doc: Document<ConfigVersion> = read_json(resp).await?;
            let attrs = doc.data.attributes;

            match attrs.status.as_str() {
                STATUS_UPLOADED => return Ok(()),
                STATUS_ERRORED => {
                    return Err(Error::BadConfigVersion {
                        code: attrs.error.unwrap_or_default(),
                        message: attrs.error_message.unwrap_or_default(),
                    })
                }
                other => {
                    tracing::debug!(status = other, "configuration version not ready");
                }
            }

            if Instant::now() + self.poll_interval > deadline {
                return Err(Error::PollTimeout(self.poll_timeout));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Create a run referencing the workspace and configuration version.
    ///
    /// The caller must have observed `uploaded` on the configuration
    /// version first. Never a destroy run.
    pub async fn create_run(
        &self,
        workspace_id: &str,
        config_version_id: &str,
        message: Option<&str>,
    ) -> Result<String> {
        let url = format!("{}/runs", self.api_host);
        let payload = json!({
            "data": {
                "type": "runs",
                "attributes": { "is-destroy": false, "message": message },
                "relationships": {
                    "workspace": {
                        "data": { "type": "workspaces", "id": workspace_id }
                    },
                    "configuration-version": {
                        "data": { "type": "configuration-versions", "id": config_version_id }
                    },
                },
            }
        });
        tracing::debug!(%url, "POST run");

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, MEDIA_TYPE)
            .timeout(REQUEST_TIMEOUT)
            .body(payload.to_string())
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            // Show both sides of the exchange for the post-mortem.
            eprintln!("PARAMS: {}", payload);
            eprintln!("ERR: {}", text);
            return Err(Error::Remote { status, body: text });
        }

        let doc: Document<Run> = serde_json::from_str(&text)?;
        Ok(doc.data.id)
    }
}

/// Check the status, then decode the body as a JSON:API document.
async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();

    if !status.is_success() {
        return Err(Error::Remote { status, body: text });
    }

    Ok(serde_json::from_str(&text)?)
}
