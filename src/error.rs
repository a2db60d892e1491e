//! Error types for fetching, exporting, saving and talking to the uploader.

use thiserror::Error;

/// A single CDN request failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport level failure (DNS, TLS, connection reset, body read).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The CDN answered with a non-success status.
    #[error("request failed with status {status}: {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// The URL that was requested
        url: String,
    },
}

/// Building an export artifact failed.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The zip container could not be written.
    #[error("failed to build archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("failed to write archive entry: {0}")]
    Io(#[from] std::io::Error),
}

/// Handing an artifact to the platform failed.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to write file: {0}")]
    Io(#[from] std::io::Error),

    /// A browser API call was rejected.
    #[error("browser download failed: {0}")]
    Web(String),
}

/// The hosted uploader could not be mounted or sent something unreadable.
#[derive(Debug, Error)]
pub enum UploaderError {
    #[error("uploader DOM error: {0}")]
    Dom(String),

    /// A `change` event payload did not match the expected entry shape.
    #[error("unreadable uploader payload: {0}")]
    Payload(#[from] serde_json::Error),
}
