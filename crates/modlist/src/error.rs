use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModlistError {
    /// Platform key not present in the registry.
    #[error("unknown platform: {0}")]
    UnknownPlatform(String),

    /// Stat carrying none of followers/assets/views.
    #[error("account stat has no followers, assets or views")]
    EmptyStat,

    /// File read/write failure.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse / serialization error.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ModlistError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
