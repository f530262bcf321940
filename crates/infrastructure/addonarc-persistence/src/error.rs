use camino::Utf8PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("archive {path} is corrupt: {source}")]
    Corrupt {
        path: Utf8PathBuf,
        source: serde_json::Error,
    },
    #[error("io error on {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        source: std::io::Error,
    },
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    Corrupt,
    Io,
    Codec,
}

impl StorageError {
    pub fn kind(&self) -> StorageErrorKind {
        match self {
            StorageError::Corrupt { .. } => StorageErrorKind::Corrupt,
            StorageError::Io { .. } => StorageErrorKind::Io,
            StorageError::Serde(_) => StorageErrorKind::Codec,
        }
    }

    pub(crate) fn io(path: &camino::Utf8Path, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
