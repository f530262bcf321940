pub mod sync;

// Re-export core engine components
pub use sync::{
    default_engine, ArchiveSyncEngine, BucketReport, CatalogEndpoints, DownloadFailure, SyncError,
    UpdateReport, UpdateStats,
};
