use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ListsError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid list-of-lists JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {0} from {1}")]
    Http(u16, String),

    #[error(transparent)]
    List(#[from] byomod_modlist::ModlistError),
}

impl ListsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
