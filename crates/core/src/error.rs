use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecodeError {
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot decode {} as {encoding}", path.display())]
    Decode { path: PathBuf, encoding: String },
    #[error("cannot encode {} as {encoding}: unmappable characters", path.display())]
    Encode { path: PathBuf, encoding: String },
    #[error("unknown encoding: {0}")]
    UnknownEncoding(String),
    #[error("confidence must be between 0 and 1, got {0}")]
    InvalidConfidence(String),
    #[error("invalid exclude pattern: {0}")]
    Glob(#[from] globset::Error),
    #[error("failed to decompress {}: {source}", path.display())]
    Decompress {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("id3 tag error on {}: {source}", path.display())]
    Tag {
        path: PathBuf,
        #[source]
        source: id3::Error,
    },
    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),
}

impl RecodeError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        RecodeError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, RecodeError>;
