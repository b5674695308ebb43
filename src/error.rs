//! Error taxonomy for the batch pipeline.
//!
//! Two classes of failure exist:
//! - Fatal preconditions ([`Error::Configuration`], [`Error::DirectoryNotFound`])
//!   are raised before any pair is dispatched and abort the whole run.
//! - Per-pair failures ([`Error::ImageRead`], [`Error::RemoteCall`]) are caught
//!   at the worker boundary and reported for that stem only; sibling pairs
//!   keep running.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing, placeholder, or malformed configuration. Fatal.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An input path does not exist or is not a directory. Fatal.
    #[error("directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// An image file could not be opened or read. Isolated to its pair.
    #[error("failed to read image {path}: {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The remote vision API call failed (network, HTTP status, auth,
    /// rate limit, or an unusable response body). Isolated to its pair.
    #[error("remote call failed: {0}")]
    RemoteCall(String),
}

impl Error {
    /// Whether this error aborts the whole run rather than one pair.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Configuration(_) | Error::DirectoryNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
