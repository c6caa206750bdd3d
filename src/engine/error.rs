use crate::assets::{DecodeError, SourceFailure};
use crate::rendering::cache::RealizeError;
use snafu::Snafu;
use std::io;
use std::path::PathBuf;

pub type Result<T, E = LoadError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)), visibility(pub(crate)))]
pub enum LoadError {
    #[snafu(display(
        "No source could open \"{key}\" ({})",
        attempts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    ))]
    NotFound {
        key: String,
        attempts: Vec<SourceFailure>,
    },

    #[snafu(display("Failed to decode \"{key}\": {source}"))]
    Decode { key: String, source: DecodeError },

    #[snafu(display("Failed to create a texture for \"{key}\": {source}"))]
    Realize { key: String, source: RealizeError },

    #[snafu(display("The texture store is shutting down"))]
    ShutdownInProgress,

    #[snafu(display("Directory {} does not exist", path.display()))]
    DirectoryNotFound { path: PathBuf },

    #[snafu(display("Failed to read directory {}: {source}", path.display()))]
    ReadDirectory { path: PathBuf, source: io::Error },

    #[snafu(display("Failed to spawn the loader thread: {source}"))]
    SpawnLoader { source: io::Error },
}

impl LoadError {
    /// The key this error is about, if it concerns a single asset.
    pub fn key(&self) -> Option<&str> {
        match self {
            LoadError::NotFound { key, .. }
            | LoadError::Decode { key, .. }
            | LoadError::Realize { key, .. } => Some(key),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound { .. })
    }
}
