use crate::catalog::{resolve_category, RemoteEntry};
use crate::{AddonRecord, VersionBucket, VersionLabel};

/// Item-scoped catalog problem. Never fatal for the bucket.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryError {
    #[error("category index {index} is outside 1..={available}")]
    CategoryOutOfRange { index: u32, available: usize },
    #[error("descriptor is missing a required field or has a mistyped one")]
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Position of the descriptor in the remote bucket.
    pub position: usize,
    pub uuid: Option<String>,
    pub error: EntryError,
}

/// A state change applied to a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Created {
        uuid: String,
        name: String,
        author: String,
        version: VersionLabel,
    },
    Updated {
        uuid: String,
        name: String,
        author: String,
        previous_version: VersionLabel,
        version: VersionLabel,
    },
    Undeleted {
        uuid: String,
        name: String,
    },
    Deleted {
        uuid: String,
        name: String,
        author: String,
    },
}

/// A file that has to be fetched as a consequence of a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    Icon {
        uuid: String,
    },
    Jar {
        uuid: String,
        name: String,
        version: VersionLabel,
    },
}

impl Mutation {
    pub fn uuid(&self) -> &str {
        match self {
            Mutation::Created { uuid, .. }
            | Mutation::Updated { uuid, .. }
            | Mutation::Undeleted { uuid, .. }
            | Mutation::Deleted { uuid, .. } => uuid,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Mutation::Created { name, .. }
            | Mutation::Updated { name, .. }
            | Mutation::Undeleted { name, .. }
            | Mutation::Deleted { name, .. } => name,
        }
    }

    /// Downloads this mutation requires. Updates assume the icon is unchanged.
    pub fn artifacts(&self) -> Vec<Artifact> {
        match self {
            Mutation::Created {
                uuid,
                name,
                version,
                ..
            } => vec![
                Artifact::Icon { uuid: uuid.clone() },
                Artifact::Jar {
                    uuid: uuid.clone(),
                    name: name.clone(),
                    version: version.clone(),
                },
            ],
            Mutation::Updated {
                uuid,
                name,
                version,
                ..
            } => vec![Artifact::Jar {
                uuid: uuid.clone(),
                name: name.clone(),
                version: version.clone(),
            }],
            Mutation::Undeleted { .. } | Mutation::Deleted { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketOutcome {
    pub bucket: String,
    pub mutations: Vec<Mutation>,
    pub skipped: Vec<SkippedEntry>,
}

impl BucketOutcome {
    pub fn is_noop(&self) -> bool {
        self.mutations.is_empty() && self.skipped.is_empty()
    }

    pub fn artifacts(&self) -> impl Iterator<Item = Artifact> + '_ {
        self.mutations.iter().flat_map(Mutation::artifacts)
    }
}

/// Brings `bucket` in line with the remote listing for the same key.
///
/// Descriptors are applied strictly in catalog order against the evolving
/// bucket, then the deletion sweep flags every live record whose
/// (uuid, name) pair is no longer listed. Records are never removed.
pub fn reconcile_bucket(
    bucket_key: &str,
    bucket: &mut VersionBucket,
    remote: &[RemoteEntry],
    categories: &[String],
) -> BucketOutcome {
    let mut outcome = BucketOutcome {
        bucket: bucket_key.to_string(),
        ..Default::default()
    };

    for (position, entry) in remote.iter().enumerate() {
        let addon = match entry {
            RemoteEntry::Addon(addon) => addon,
            RemoteEntry::Malformed(_) => {
                outcome.skipped.push(SkippedEntry {
                    position,
                    uuid: entry.uuid_hint().map(str::to_string),
                    error: EntryError::Malformed,
                });
                continue;
            }
        };

        let Some(category) = resolve_category(categories, addon.category) else {
            outcome.skipped.push(SkippedEntry {
                position,
                uuid: Some(addon.uuid.clone()),
                error: EntryError::CategoryOutOfRange {
                    index: addon.category,
                    available: categories.len(),
                },
            });
            continue;
        };

        match bucket.iter().position(|r| r.uuid == addon.uuid) {
            None => {
                bucket.push(AddonRecord::from_remote(addon, category.to_string()));
                outcome.mutations.push(Mutation::Created {
                    uuid: addon.uuid.clone(),
                    name: addon.name.clone(),
                    author: addon.author.clone(),
                    version: addon.version.clone(),
                });
            }
            Some(idx) if bucket[idx].version != addon.version => {
                let replaced = std::mem::replace(
                    &mut bucket[idx],
                    AddonRecord::from_remote(addon, category.to_string()),
                );
                outcome.mutations.push(Mutation::Updated {
                    uuid: addon.uuid.clone(),
                    name: addon.name.clone(),
                    author: addon.author.clone(),
                    previous_version: replaced.version,
                    version: addon.version.clone(),
                });
            }
            Some(idx) if bucket[idx].is_deleted => {
                bucket[idx].is_deleted = false;
                outcome.mutations.push(Mutation::Undeleted {
                    uuid: addon.uuid.clone(),
                    name: bucket[idx].name.clone(),
                });
            }
            Some(_) => {}
        }
    }

    for record in bucket.iter_mut().filter(|r| !r.is_deleted) {
        let listed = remote
            .iter()
            .any(|entry| entry.lists(&record.uuid, &record.name));
        if !listed {
            record.is_deleted = true;
            outcome.mutations.push(Mutation::Deleted {
                uuid: record.uuid.clone(),
                name: record.name.clone(),
                author: record.author.clone(),
            });
        }
    }

    outcome
}
