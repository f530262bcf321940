use addonarc_core::Archive;

/// Durable home of the archive.
///
/// `load` returns an empty archive when nothing was persisted yet and fails
/// on unreadable content. `save` replaces the previous state atomically:
/// readers observe either the old document or the new one, never a mix.
pub trait ArchiveStore: Send + Sync {
    fn load(&self) -> Result<Archive, crate::StorageError>;

    fn save(&self, archive: &Archive) -> Result<(), crate::StorageError>;
}
