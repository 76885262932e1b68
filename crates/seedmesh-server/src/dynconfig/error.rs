//! Dynconfig errors

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The manager call failed
    #[error("fetch dynconfig from manager: {0}")]
    Fetch(#[source] tonic::Status),

    #[error("fetch dynconfig from manager timed out after {0:?}")]
    FetchTimeout(Duration),

    /// Payload or config blob does not match the expected shape
    #[error("decode dynconfig: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("missing {0} in dynconfig")]
    MissingConfig(&'static str),

    #[error("can not find available seed peer addresses")]
    NoReachablePeers,

    #[error("dynconfig cache {}: {source}", path.display())]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dynconfig is already serving")]
    AlreadyServing,

    #[error("dynconfig is stopped")]
    Stopped,
}

impl Error {
    pub(crate) fn cache_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::CacheIo {
            path: path.into(),
            source,
        }
    }
}

impl From<tonic::Status> for Error {
    fn from(status: tonic::Status) -> Self {
        Error::Fetch(status)
    }
}
