use std::path::PathBuf;

use crate::TagId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed map text at line {line}, column {column}: {message}")]
    Malformed {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("malformed map file {}: {source}", path.display())]
    MapFile {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("arc endpoints must differ (tag {id})")]
    SelfArc { id: TagId },

    #[error("cannot persist non-finite {what}")]
    NonFinite { what: String },

    #[error("unknown tag {id}")]
    UnknownTag { id: TagId },

    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Attaches `path` to a parse error raised while reading that file.
    pub(crate) fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            err @ Self::Malformed { .. } => Self::MapFile {
                path: path.into(),
                source: Box::new(err),
            },
            other => other,
        }
    }
}
