use std::io::Write;

use addonarc_core::Archive;
use camino::{Utf8Path, Utf8PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::{ArchiveStore, DataLayout, StorageError};

/// Archive persisted as a single JSON document.
#[derive(Debug, Clone)]
pub struct JsonArchiveStore {
    path: Utf8PathBuf,
}

impl JsonArchiveStore {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn for_layout(layout: &DataLayout) -> Self {
        Self::new(layout.archive_path())
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl ArchiveStore for JsonArchiveStore {
    fn load(&self) -> Result<Archive, StorageError> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no archive at {}, starting empty", self.path);
                return Ok(Archive::new());
            }
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        serde_json::from_slice(&data).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, archive: &Archive) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_str().is_empty() => p.to_path_buf(),
            _ => Utf8PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;

        let data = serde_json::to_vec_pretty(archive)?;

        // Same directory as the target so the final rename stays on one filesystem.
        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| StorageError::io(&dir, e))?;
        tmp.write_all(&data)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| StorageError::io(&self.path, e))?;
        tmp.persist(&self.path)
            .map_err(|e| StorageError::io(&self.path, e.error))?;

        debug!("archive saved to {} ({} bytes)", self.path, data.len());
        Ok(())
    }
}
