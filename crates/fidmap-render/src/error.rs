use std::path::PathBuf;

use fidmap_core::TagId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("nothing to draw: the bounding box is empty")]
    EmptyBounds,

    #[error("unsupported units `{units}` (expected cm, mm or in)")]
    InvalidUnits { units: String },

    #[error("tag id {id} does not fit the 16-bit tag payload")]
    TagIdRange { id: TagId },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
