use crate::DocId;
use std::path::PathBuf;

/// Failures surfaced by the build side of the engine.
///
/// Only `NotFound`, `MalformedArchive`, `Io` and `DuplicateDocument` ever reach a caller.
/// `ParseDegraded` and `CacheCorrupt` are built so they can be logged with a uniform
/// message while the build carries on.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("not found: {entry} (archive {})", .archive.display())]
    NotFound { archive: PathBuf, entry: String },

    #[error("malformed archive {}: {source}", .archive.display())]
    MalformedArchive {
        archive: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("degraded parse of {path}: {reason}")]
    ParseDegraded { path: String, reason: String },

    #[error("discarding cache entry {}: {reason}", .path.display())]
    CacheCorrupt { path: PathBuf, reason: String },

    #[error("document id {0} added twice")]
    DuplicateDocument(DocId),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;
