//! Error types for the load pipeline.
//!
//! Malformed markup never produces an error. A load fails only when the
//! page source cannot deliver decoded text or when the metrics service
//! cannot measure a style.

use std::path::PathBuf;

use thiserror::Error;

use crate::font::MetricsError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported scheme {0:?}")]
    UnsupportedScheme(String),

    /// The response was framed or compressed in a way the core does not decode.
    #[error("unsupported {header} {value:?} in response")]
    UnsupportedEncoding { header: String, value: String },

    #[error("no document at {0}")]
    NotFound(String),

    #[error("HTTP error: {0}")]
    HttpStatus(u16),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("measurement failed: {0}")]
    Metrics(#[from] MetricsError),
}
