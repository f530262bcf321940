use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub mod catalog;
pub mod reconcile;

pub use catalog::{RemoteAddon, RemoteCatalog, RemoteEntry};
pub use reconcile::{reconcile_bucket, Artifact, BucketOutcome, EntryError, Mutation, SkippedEntry};

/// Extra descriptor fields carried through verbatim (description, flags, ...).
pub type ExtraFields = serde_json::Map<String, serde_json::Value>;

/// Ordered records of one version bucket, in discovery order.
pub type VersionBucket = Vec<AddonRecord>;

/// Version label as published by the catalog. The catalog has used both
/// strings and bare numbers, so the raw JSON form is preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VersionLabel {
    Text(String),
    Number(serde_json::Number),
}

impl VersionLabel {
    pub fn as_label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for VersionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionLabel::Text(s) => f.write_str(s),
            VersionLabel::Number(n) => write!(f, "{n}"),
        }
    }
}

// `"2"` and `2` are the same release.
impl PartialEq for VersionLabel {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (VersionLabel::Text(a), VersionLabel::Text(b)) => a == b,
            _ => self.as_label() == other.as_label(),
        }
    }
}

impl Eq for VersionLabel {}

impl From<&str> for VersionLabel {
    fn from(value: &str) -> Self {
        VersionLabel::Text(value.to_string())
    }
}

/// One archived add-on, scoped to a version bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddonRecord {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub author: String,
    pub version: VersionLabel,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl AddonRecord {
    /// Builds a live record from a remote descriptor and its resolved category.
    pub fn from_remote(remote: &RemoteAddon, category: String) -> Self {
        let mut extra = remote.extra.clone();
        extra.remove("isDeleted");
        Self {
            uuid: remote.uuid.clone(),
            name: remote.name.clone(),
            author: remote.author.clone(),
            version: remote.version.clone(),
            category,
            is_deleted: false,
            extra,
        }
    }
}

/// The persisted aggregate: version bucket key -> records.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Archive {
    #[serde(default)]
    pub addons: BTreeMap<String, VersionBucket>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    pub buckets: usize,
    pub records: usize,
    pub deleted: usize,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket(&self, key: &str) -> Option<&VersionBucket> {
        self.addons.get(key)
    }

    /// Returns the bucket for `key`, creating an empty one if needed.
    pub fn bucket_mut(&mut self, key: &str) -> &mut VersionBucket {
        self.addons.entry(key.to_string()).or_default()
    }

    /// Every (bucket, record) pair carrying `uuid`, in bucket key order.
    pub fn find(&self, uuid: &str) -> Vec<(&str, &AddonRecord)> {
        self.addons
            .iter()
            .flat_map(|(key, bucket)| {
                bucket
                    .iter()
                    .filter(move |r| r.uuid == uuid)
                    .map(move |r| (key.as_str(), r))
            })
            .collect()
    }

    pub fn stats(&self) -> ArchiveStats {
        let mut stats = ArchiveStats {
            buckets: self.addons.len(),
            ..Default::default()
        };
        for record in self.addons.values().flatten() {
            stats.records += 1;
            if record.is_deleted {
                stats.deleted += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_label_compares_across_json_types() {
        let text: VersionLabel = serde_json::from_str("\"12\"").unwrap();
        let number: VersionLabel = serde_json::from_str("12").unwrap();
        assert_eq!(text, number);
        assert_ne!(text, VersionLabel::from("12.1"));
    }

    #[test]
    fn record_reads_legacy_entry_without_deleted_flag() {
        let record: AddonRecord = serde_json::from_str(
            r#"{"uuid":"a1","name":"Foo","author":"X","version":"1.0","category":"Utility","description":"hi"}"#,
        )
        .unwrap();
        assert!(!record.is_deleted);
        assert_eq!(record.extra.get("description").unwrap(), "hi");

        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["isDeleted"], false);
        assert_eq!(out["description"], "hi");
    }

    #[test]
    fn find_spans_buckets() {
        let record = AddonRecord {
            uuid: "a1".into(),
            name: "Foo".into(),
            author: "X".into(),
            version: "1.0".into(),
            category: "Utility".into(),
            is_deleted: false,
            extra: ExtraFields::new(),
        };
        let mut archive = Archive::new();
        archive.bucket_mut("112").push(record.clone());
        archive.bucket_mut("18").push(record);
        archive.bucket_mut("116");

        let hits: Vec<&str> = archive.find("a1").into_iter().map(|(k, _)| k).collect();
        assert_eq!(hits, vec!["112", "18"]);
        assert!(archive.find("zz").is_empty());
        assert_eq!(
            archive.stats(),
            ArchiveStats {
                buckets: 3,
                records: 2,
                deleted: 0
            }
        );
    }
}
