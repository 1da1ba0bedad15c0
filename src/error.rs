use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a user-facing operation.
///
/// Malformed annotation content never ends up here; the normalizer reports
/// it as diagnostics instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("no image-label pairs found in {0}")]
    NoPairsFound(PathBuf),

    #[error("please enter a number between 1 and {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid position {0:?}: please enter a valid number")]
    InvalidPosition(String),

    #[error("no image loaded")]
    NoImageLoaded,

    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
