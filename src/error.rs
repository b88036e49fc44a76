use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the library modules. Extraction and resolution never fail;
/// these cover lookups and the filesystem edges of the pipeline.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A canonical path that is not part of the current snapshot.
    #[error("file not found in project: {0}")]
    UnknownFile(String),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("project root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("invalid exclude pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// A render loop ended without handing its surface back.
    #[error("render loop terminated unexpectedly")]
    RenderLoopLost,
}
