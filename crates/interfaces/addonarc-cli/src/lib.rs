pub mod commands;
pub mod render;

use addonarc_pipeline::CatalogEndpoints;
use camino::Utf8PathBuf;
use clap::ValueEnum;

/// Which records `list` prints.
#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq, Default)]
pub enum CliDeletedFilter {
    /// Live and deleted records, deleted ones annotated.
    #[default]
    Include,
    /// Only records still published upstream.
    Exclude,
    /// Only records no longer published upstream.
    Only,
}

impl CliDeletedFilter {
    pub fn admits(self, is_deleted: bool) -> bool {
        match self {
            CliDeletedFilter::Include => true,
            CliDeletedFilter::Exclude => !is_deleted,
            CliDeletedFilter::Only => is_deleted,
        }
    }
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub data_dir: Utf8PathBuf,
    pub endpoints: CatalogEndpoints,
}
