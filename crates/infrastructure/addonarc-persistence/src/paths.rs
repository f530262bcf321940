use addonarc_config::{ADDONS_DIRNAME, ARCHIVE_FILENAME, BUCKET_DIR_PREFIX, ICON_FILENAME};
use addonarc_core::VersionLabel;
use camino::Utf8PathBuf;

/// On-disk layout below the data directory:
///
/// ```text
/// <root>/archive.json
/// <root>/addons/mc<bucket>/<uuid>/icon.png
/// <root>/addons/mc<bucket>/<uuid>/<name>-v<version>.jar
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: Utf8PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn archive_path(&self) -> Utf8PathBuf {
        self.root.join(ARCHIVE_FILENAME)
    }

    pub fn addons_root(&self) -> Utf8PathBuf {
        self.root.join(ADDONS_DIRNAME)
    }

    pub fn addon_dir(&self, bucket: &str, uuid: &str) -> Utf8PathBuf {
        self.addons_root()
            .join(sanitize_component(&format!("{BUCKET_DIR_PREFIX}{bucket}")))
            .join(sanitize_component(uuid))
    }

    pub fn icon_path(&self, bucket: &str, uuid: &str) -> Utf8PathBuf {
        self.addon_dir(bucket, uuid).join(ICON_FILENAME)
    }

    pub fn jar_path(
        &self,
        bucket: &str,
        uuid: &str,
        name: &str,
        version: &VersionLabel,
    ) -> Utf8PathBuf {
        self.addon_dir(bucket, uuid)
            .join(sanitize_component(&format!("{name}-v{version}.jar")))
    }
}

/// Makes a catalog-provided string safe to use as a single path component.
pub fn sanitize_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}
