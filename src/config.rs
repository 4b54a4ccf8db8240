// src/config.rs

use crate::error::{Error, Result};
use std::env;

/// Default Terraform Cloud API endpoint, overridable with `TF_API_HOST`.
pub const DEFAULT_API_HOST: &str = "https://app.terraform.io/api/v2";

/// Remote endpoint and credentials, resolved once at startup.
///
/// Everything comes from the process environment (a `.env` file is loaded
/// first if present):
/// - `TF_API_HOST`: API base URL (optional, has a default)
/// - `TF_USER_TOKEN`: bearer token (required)
/// - `TF_WORKSPACE_NAME`: target workspace (required)
/// - `TF_ORG_NAME`: owning organization (required)
///
/// Business logic never reads the environment directly; it gets this
/// struct instead.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_host: String,
    pub token: String,
    pub workspace: String,
    pub org: String,
}

impl Config {
    /// Resolve the configuration from the environment.
    ///
    /// Fails with [`Error::MissingConfiguration`] naming every absent
    /// required variable at once. Must run before any network call.
    pub fn from_env() -> Result<Self> {
        let api_host = env::var("TF_API_HOST").unwrap_or_else(|_| DEFAULT_API_HOST.to_string());

        let token = env::var("TF_USER_TOKEN").ok();
        let workspace = env::var("TF_WORKSPACE_NAME").ok();
        let org = env::var("TF_ORG_NAME").ok();

        let mut missing = Vec::new();
        if token.is_none() {
            missing.push("TF_USER_TOKEN");
        }
        if workspace.is_none() {
            missing.push("TF_WORKSPACE_NAME");
        }
        if org.is_none() {
            missing.push("TF_ORG_NAME");
        }

        if !missing.is_empty() {
            return Err(Error::MissingConfiguration(missing.join(", ")));
        }

        Ok(Self {
            api_host,
            token: token.unwrap_or_default(),
            workspace: workspace.unwrap_or_default(),
            org: org.unwrap_or_default(),
        })
    }
}
