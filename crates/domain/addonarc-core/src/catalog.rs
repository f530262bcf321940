use crate::{ExtraFields, VersionLabel};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Represents the remote `addons.json` catalog document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteCatalog {
    pub addons: BTreeMap<String, Vec<RemoteEntry>>,
    pub categories: Vec<String>,
}

/// A single catalog descriptor. Entries that do not carry the required
/// fields are kept as raw JSON so one bad entry cannot sink the whole catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteEntry {
    Addon(RemoteAddon),
    Malformed(Value),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteAddon {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub author: String,
    pub version: VersionLabel,
    /// 1-based index into [`RemoteCatalog::categories`]. Older catalogs
    /// ship it as a numeric string.
    #[serde(deserialize_with = "category_index")]
    pub category: u32,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl RemoteEntry {
    pub fn as_addon(&self) -> Option<&RemoteAddon> {
        match self {
            RemoteEntry::Addon(addon) => Some(addon),
            RemoteEntry::Malformed(_) => None,
        }
    }

    /// Best-effort uuid for log lines.
    pub fn uuid_hint(&self) -> Option<&str> {
        match self {
            RemoteEntry::Addon(addon) => Some(addon.uuid.as_str()),
            RemoteEntry::Malformed(raw) => raw.get("uuid").and_then(Value::as_str),
        }
    }

    /// Whether this descriptor lists the (uuid, name) pair. Malformed
    /// descriptors still count when both fields are present as strings.
    pub fn lists(&self, uuid: &str, name: &str) -> bool {
        match self {
            RemoteEntry::Addon(addon) => addon.uuid == uuid && addon.name == name,
            RemoteEntry::Malformed(raw) => {
                raw.get("uuid").and_then(Value::as_str) == Some(uuid)
                    && raw.get("name").and_then(Value::as_str) == Some(name)
            }
        }
    }
}

impl RemoteCatalog {
    pub fn bucket(&self, key: &str) -> &[RemoteEntry] {
        self.addons.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn category_index<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Index {
        Number(u32),
        Text(String),
    }

    match Index::deserialize(deserializer)? {
        Index::Number(index) => Ok(index),
        Index::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

pub(crate) fn resolve_category(categories: &[String], index: u32) -> Option<&str> {
    let slot = usize::try_from(index).ok()?.checked_sub(1)?;
    categories.get(slot).map(String::as_str)
}
