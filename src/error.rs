// src/error.rs

use reqwest::StatusCode;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Every way a deploy can fail, discriminated so the caller (and the tests)
/// can tell configuration problems from archive problems from remote ones.
#[derive(Debug, Error)]
pub enum Error {
    /// Required environment variables are absent. Raised before any
    /// network activity.
    #[error("must set {0} env vars")]
    MissingConfiguration(String),

    /// An explicitly listed file or directory does not exist under the
    /// archive root.
    #[error("archive source {0:?} does not exist")]
    MissingSource(PathBuf),

    /// A glob pattern failed to parse. Patterns that parse but match
    /// nothing are not an error.
    #[error("invalid glob pattern {pattern:?}: {source}")]
    BadPattern {
        pattern: String,
        source: glob::PatternError,
    },

    /// Non-2xx response from the Terraform Cloud API or the upload URL.
    #[error("remote API request failed: {status}: {body}")]
    Remote { status: StatusCode, body: String },

    /// The remote system rejected the uploaded configuration version.
    #[error("bad status on config-version upload: {code} - {message}")]
    BadConfigVersion { code: String, message: String },

    /// The configuration version never reached a terminal status.
    #[error("configuration version not uploaded after {0:?}")]
    PollTimeout(Duration),

    /// A 2xx response whose body did not decode as the expected JSON:API
    /// document.
    #[error("remote API returned invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
