use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("config store I/O failed on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config object key '{key}': must be a plain file stem")]
    InvalidKey { key: String },

    #[error("glob pattern error: {pattern}: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to decode config object '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to encode config object '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_yaml::Error,
    },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
