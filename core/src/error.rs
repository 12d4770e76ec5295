//! Error types for document discovery and mapping.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    /// The root path could not be stat'ed.
    #[error("cannot access {path}: {source}")]
    RootAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    /// Any failure while walking the tree aborts discovery.
    #[error("error while scanning directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// A single document could not be opened or read to the end.
    #[error("{path}: {source}")]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, IndexError>;
