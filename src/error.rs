//! # Errors
//!
//! One error type for the whole library. Configuration, git and counting-tool
//! failures are fatal for a run; report parse failures are logged by the
//! loader and never surface here.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration file {0} not found")]
    ConfigMissing(PathBuf),

    #[error("configuration file {path} is not valid JSON: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration is incomplete: {0} is missing or empty")]
    ConfigIncomplete(&'static str),

    #[error("git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("`{program}` failed with {status}")]
    ToolFailed { program: String, status: ExitStatus },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("chart rendering failed: {0}")]
    Chart(String),

    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no usable scc reports in {0}")]
    NoData(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
